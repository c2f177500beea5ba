//! Typed response payloads.
//!
//! Every response payload begins with the same [`CommonResponse`] prefix.
//! What follows depends on the command: a few commands end right after the
//! prefix, a few have a typed tail, and the rest keep their tail as opaque
//! bytes. Typed tails whose inner lists have no known entry layout keep
//! those lists raw and decode only the fixed fields around them.

use bytes::{BufMut, Bytes};
use serde::{Deserialize, Serialize};
use vlwire_codec::{CodecError, Field, Reader, StructFormat, VLong, Wire, decode_vlong};

use crate::codec::{Frame, Message};
use crate::error::TypedCommandError;
use crate::Command;

/// The prefix shared by every response payload.
///
/// ```text
/// reserved: u16 │ server_time: i64 │ data_versions: VLong list │ achieved_mission_flag: u8
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommonResponse {
    pub reserved: u16,
    pub server_time: i64,
    /// Master-data versions; each element is a VLong on the wire.
    pub data_versions: Vec<i64>,
    pub achieved_mission_flag: u8,
}

impl Wire for CommonResponse {
    fn encode(&self, dst: &mut impl BufMut) {
        self.reserved.encode(dst);
        self.server_time.encode(dst);
        let versions: Vec<VLong> = self.data_versions.iter().copied().map(VLong).collect();
        versions.encode(dst);
        self.achieved_mission_flag.encode(dst);
    }

    fn decode(src: &mut Reader<'_>) -> Result<Self, CodecError> {
        let reserved = u16::decode(src)?;
        let server_time = i64::decode(src)?;
        let data_versions = Vec::<VLong>::decode(src)?
            .into_iter()
            .map(i64::from)
            .collect();
        let achieved_mission_flag = u8::decode(src)?;
        Ok(Self {
            reserved,
            server_time,
            data_versions,
            achieved_mission_flag,
        })
    }
}

/// First page of a mission-set listing. The mission sets themselves stay
/// opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionSetInfoPage {
    pub page: i32,
    pub page_size: i32,
    pub last_page: i32,
    pub mission_sets: Bytes,
}

impl Wire for MissionSetInfoPage {
    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_i32_le(self.page);
        dst.put_i32_le(self.page_size);
        dst.put_i32_le(self.last_page);
        dst.put_slice(&self.mission_sets);
    }

    fn decode(src: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            page: src.read_i32_le()?,
            page_size: src.read_i32_le()?,
            last_page: src.read_i32_le()?,
            mission_sets: Bytes::copy_from_slice(src.take_rest()),
        })
    }
}

/// Descriptor of the fixed head of a `CheckNewDay` response.
const NEW_DAY_HEAD: &str = "bii";

/// The day-rollover status answering `CheckNewDay`.
///
/// Only the leading counters are decoded. The login-bonus, stamina and
/// mission details that follow are kept raw in `rest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDayStatus {
    pub new_day: u8,
    pub total_login_count: i32,
    pub continuous_login_count: i32,
    pub rest: Bytes,
}

impl Wire for NewDayStatus {
    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u8(self.new_day);
        dst.put_i32_le(self.total_login_count);
        dst.put_i32_le(self.continuous_login_count);
        dst.put_slice(&self.rest);
    }

    fn decode(src: &mut Reader<'_>) -> Result<Self, CodecError> {
        let head = StructFormat::parse(NEW_DAY_HEAD)?.read(src)?;
        let &[
            Field::Byte(new_day),
            Field::Int(total_login_count),
            Field::Int(continuous_login_count),
        ] = head.as_slice()
        else {
            return Err(CodecError::FieldMismatch {
                index: 0,
                expected: 'b',
            });
        };
        Ok(Self {
            new_day: new_day as u8,
            total_login_count,
            continuous_login_count,
            rest: Bytes::copy_from_slice(src.take_rest()),
        })
    }
}

/// Takes the rest of `src` as a list with unknown entries followed by
/// `tail_len` fixed bytes. Returns the list (count prefix included) and
/// the tail.
fn split_list_and_tail<'a>(
    src: &mut Reader<'a>,
    tail_len: usize,
) -> Result<(&'a [u8], &'a [u8]), CodecError> {
    let needed = 1 + tail_len;
    let available = src.remaining();
    if available < needed {
        return Err(CodecError::TruncatedBuffer { needed, available });
    }
    let rest = src.take_rest();
    let (list, tail) = rest.split_at(rest.len() - tail_len);
    let (count, _) = decode_vlong(list)?;
    if count < 0 {
        return Err(CodecError::InvalidLength(count));
    }
    Ok((list, tail))
}

/// One page of the present box.
///
/// The entries stay opaque; `present_boxes` is the count-prefixed list as
/// it appeared on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentBoxPage {
    pub present_boxes: Bytes,
    pub page_size: i32,
    pub page: i32,
    pub is_next_page: bool,
}

impl Wire for PresentBoxPage {
    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_slice(&self.present_boxes);
        self.page_size.encode(dst);
        self.page.encode(dst);
        self.is_next_page.encode(dst);
    }

    fn decode(src: &mut Reader<'_>) -> Result<Self, CodecError> {
        let (list, tail) = split_list_and_tail(src, 4 + 4 + 1)?;
        let mut tail = Reader::new(tail);
        Ok(Self {
            present_boxes: Bytes::copy_from_slice(list),
            page_size: i32::decode(&mut tail)?,
            page: i32::decode(&mut tail)?,
            is_next_page: bool::decode(&mut tail)?,
        })
    }
}

/// What a `ReceivePresentBox` handed out: the granted items, kept opaque,
/// and the resulting zeny balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedPresents {
    pub given_items: Bytes,
    pub zeny: i64,
}

impl Wire for ReceivedPresents {
    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_slice(&self.given_items);
        self.zeny.encode(dst);
    }

    fn decode(src: &mut Reader<'_>) -> Result<Self, CodecError> {
        let (list, tail) = split_list_and_tail(src, 8)?;
        Ok(Self {
            given_items: Bytes::copy_from_slice(list),
            zeny: i64::decode(&mut Reader::new(tail))?,
        })
    }
}

/// A catalogued command that has no typed response layout.
///
/// Only such commands can travel as [`ResponseBody::Opaque`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Command", into = "Command")]
pub struct UntypedResponse(pub(crate) Command);

impl UntypedResponse {
    pub fn new(command: Command) -> Option<Self> {
        Self::try_from(command).ok()
    }

    pub fn command(self) -> Command {
        self.0
    }
}

impl TryFrom<Command> for UntypedResponse {
    type Error = TypedCommandError;

    fn try_from(command: Command) -> Result<Self, Self::Error> {
        if ResponseBody::has_layout(command) {
            Err(TypedCommandError(command))
        } else {
            Ok(Self(command))
        }
    }
}

impl From<UntypedResponse> for Command {
    fn from(untyped: UntypedResponse) -> Self {
        untyped.0
    }
}

/// The command-specific part of a response, after the common prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResponseBody {
    CheckAlive,
    SetNextLoginBonusItem,
    CheckNewDay(NewDayStatus),
    GetPresentBox(PresentBoxPage),
    ReceivePresentBox(ReceivedPresents),
    GetMissionSetInfo(MissionSetInfoPage),

    /// Any other catalogued command; `body` is everything after the prefix.
    Opaque { command: UntypedResponse, body: Bytes },
}

impl ResponseBody {
    pub fn command(&self) -> Command {
        match self {
            Self::CheckAlive => Command::CheckAlive,
            Self::SetNextLoginBonusItem => Command::SetNextLoginBonusItem,
            Self::CheckNewDay(_) => Command::CheckNewDay,
            Self::GetPresentBox(_) => Command::GetPresentBox,
            Self::ReceivePresentBox(_) => Command::ReceivePresentBox,
            Self::GetMissionSetInfo(_) => Command::GetMissionSetInfo,
            Self::Opaque { command, .. } => command.command(),
        }
    }

    /// `true` if `command` has a variant of its own rather than
    /// [`Opaque`](Self::Opaque).
    pub fn has_layout(command: Command) -> bool {
        matches!(
            command,
            Command::CheckAlive
                | Command::SetNextLoginBonusItem
                | Command::CheckNewDay
                | Command::GetPresentBox
                | Command::ReceivePresentBox
                | Command::GetMissionSetInfo
        )
    }

    /// An opaque body for `command`.
    ///
    /// # Errors
    /// [`TypedCommandError`] if `command` has a typed variant.
    pub fn opaque(command: Command, body: impl Into<Bytes>) -> Result<Self, TypedCommandError> {
        Ok(Self::Opaque {
            command: UntypedResponse::try_from(command)?,
            body: body.into(),
        })
    }
}

/// A decoded response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub common: CommonResponse,
    pub body: ResponseBody,
}

impl Response {
    pub fn new(common: CommonResponse, body: ResponseBody) -> Self {
        Self { common, body }
    }

    /// Encodes a complete packet, header included.
    pub fn encode(&self, sequence: i64) -> Vec<u8> {
        Frame::new(sequence, self).encode()
    }
}

impl Message for Response {
    fn command(&self) -> Command {
        self.body.command()
    }

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.common.encode(dst);
        match &self.body {
            ResponseBody::CheckAlive | ResponseBody::SetNextLoginBonusItem => {}
            ResponseBody::CheckNewDay(status) => status.encode(dst),
            ResponseBody::GetPresentBox(page) => page.encode(dst),
            ResponseBody::ReceivePresentBox(received) => received.encode(dst),
            ResponseBody::GetMissionSetInfo(page) => page.encode(dst),
            ResponseBody::Opaque { body, .. } => dst.put_slice(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix_bytes() -> Vec<u8> {
        let mut buf = vec![0x00, 0x00];
        buf.extend_from_slice(&1_700_000_000i64.to_le_bytes());
        buf.extend_from_slice(&[0x82, 0x81, 0x00, 0x81]); // [1, 64]
        buf.push(1);
        buf
    }

    #[test]
    fn test_common_prefix_decodes() {
        let buf = prefix_bytes();
        let (common, used) = CommonResponse::from_wire(&buf).unwrap();
        assert_eq!(used, buf.len());
        assert_eq!(
            common,
            CommonResponse {
                reserved: 0,
                server_time: 1_700_000_000,
                data_versions: vec![1, 64],
                achieved_mission_flag: 1,
            }
        );
    }

    #[test]
    fn test_common_prefix_encodes_back() {
        let buf = prefix_bytes();
        let (common, _) = CommonResponse::from_wire(&buf).unwrap();
        assert_eq!(common.to_wire(), buf);
    }

    #[test]
    fn test_missing_flag_is_truncated() {
        let mut buf = prefix_bytes();
        buf.pop();
        assert_eq!(
            CommonResponse::from_wire(&buf),
            Err(CodecError::TruncatedBuffer {
                needed: 1,
                available: 0
            })
        );
    }

    #[test]
    fn test_mission_set_info_keeps_tail() {
        let mut buf = Vec::new();
        for v in [1i32, 20, 5] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf.extend_from_slice(&[0xAA, 0xBB]);
        let (page, used) = MissionSetInfoPage::from_wire(&buf).unwrap();
        assert_eq!((page.page, page.page_size, page.last_page), (1, 20, 5));
        assert_eq!(&page.mission_sets[..], &[0xAA, 0xBB]);
        assert_eq!(used, buf.len());
    }

    #[test]
    fn test_response_body_bytes_start_with_prefix() {
        let response = Response::new(
            CommonResponse::default(),
            ResponseBody::opaque(Command::GetHomeInfo, vec![7u8]).unwrap(),
        );
        let mut body = Vec::new();
        response.encode_body(&mut body);
        let mut expected = CommonResponse::default().to_wire();
        expected.push(7);
        assert_eq!(body, expected);
        assert_eq!(response.command(), Command::GetHomeInfo);
    }

    #[test]
    fn test_new_day_head_is_byte_int_int() {
        let buf = [1, 5, 0, 0, 0, 3, 0, 0, 0, 0xEE];
        let (status, used) = NewDayStatus::from_wire(&buf).unwrap();
        assert_eq!(status.new_day, 1);
        assert_eq!(status.total_login_count, 5);
        assert_eq!(status.continuous_login_count, 3);
        assert_eq!(&status.rest[..], &[0xEE]);
        assert_eq!(used, buf.len());
        assert_eq!(status.to_wire(), buf);
    }

    #[test]
    fn test_short_new_day_head_is_truncated() {
        assert_eq!(
            NewDayStatus::from_wire(&[1, 5, 0]),
            Err(CodecError::TruncatedBuffer {
                needed: 9,
                available: 3
            })
        );
    }

    #[test]
    fn test_present_box_page_reads_tail_after_entries() {
        let mut buf = vec![0x81, 0xAA, 0xBB];
        buf.extend_from_slice(&20i32.to_le_bytes());
        buf.extend_from_slice(&2i32.to_le_bytes());
        buf.push(1);
        let (page, used) = PresentBoxPage::from_wire(&buf).unwrap();
        assert_eq!(&page.present_boxes[..], &[0x81, 0xAA, 0xBB]);
        assert_eq!((page.page_size, page.page), (20, 2));
        assert!(page.is_next_page);
        assert_eq!(used, buf.len());
        assert_eq!(page.to_wire(), buf);
    }

    #[test]
    fn test_received_presents_zeny_is_last_eight_bytes() {
        let mut buf = vec![0x80];
        buf.extend_from_slice(&1_000i64.to_le_bytes());
        let (received, _) = ReceivedPresents::from_wire(&buf).unwrap();
        assert_eq!(&received.given_items[..], &[0x80]);
        assert_eq!(received.zeny, 1_000);
    }

    #[test]
    fn test_empty_received_presents_is_truncated() {
        assert_eq!(
            ReceivedPresents::from_wire(&[]),
            Err(CodecError::TruncatedBuffer {
                needed: 9,
                available: 0
            })
        );
    }

    #[test]
    fn test_negative_present_count_is_invalid_length() {
        let mut buf = vec![0xC0];
        buf.extend_from_slice(&0i64.to_le_bytes());
        assert_eq!(
            ReceivedPresents::from_wire(&buf),
            Err(CodecError::InvalidLength(-1))
        );
    }

    #[test]
    fn test_typed_response_command_cannot_be_opaque() {
        for command in [
            Command::CheckNewDay,
            Command::GetPresentBox,
            Command::ReceivePresentBox,
        ] {
            assert_eq!(
                ResponseBody::opaque(command, Bytes::new()),
                Err(TypedCommandError(command))
            );
        }
        assert!(UntypedResponse::new(Command::GetHomeInfo).is_some());
    }
}
