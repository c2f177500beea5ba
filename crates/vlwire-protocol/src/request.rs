//! Typed request payloads.
//!
//! A [`Request`] is the body of one outgoing command. Commands whose
//! layout is known get a variant with real fields; the rest of the
//! catalogue travels as [`Request::Opaque`] with its payload bytes kept
//! verbatim.
//!
//! Several commands share a layout. They share the payload type too
//! ([`Page`], [`MissionInfo`]) rather than each redeclaring the same
//! fields.

use bytes::{BufMut, Bytes};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vlwire_codec::{CodecError, Reader, Wire, read_vlong};

use crate::codec::{Frame, Message};
use crate::error::TypedCommandError;
use crate::Command;

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// First packet of a session: who we are and which API we speak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLogin {
    pub guid: Uuid,
    pub key: [u8; 16],
    pub api_version: u16,
    pub region_id: String,
    pub language_id: String,
}
wire_struct!(RequestLogin { guid, key, api_version, region_id, language_id });

/// Answers the server's challenge with the session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hello {
    pub token: [u8; 16],
}
wire_struct!(Hello { token });

/// Logs a user in once the session is established.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginUser {
    pub rom_type: u8,
    pub platform_id: u8,
    pub platform_user_id: String,
    pub country_code: String,
    pub currency_code: String,
    pub ad_id: String,
}
wire_struct!(LoginUser {
    rom_type,
    platform_id,
    platform_user_id,
    country_code,
    currency_code,
    ad_id,
});

impl LoginUser {
    /// The ROM type every shipping client reports.
    pub const DEFAULT_ROM_TYPE: u8 = 2;

    pub fn new(platform_id: u8, platform_user_id: impl Into<String>) -> Self {
        Self {
            rom_type: Self::DEFAULT_ROM_TYPE,
            platform_id,
            platform_user_id: platform_user_id.into(),
            country_code: String::new(),
            currency_code: String::new(),
            ad_id: String::new(),
        }
    }
}

/// Reads server-side key/value settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetValue {
    pub keys: Vec<String>,
}
wire_struct!(GetValue { keys });

/// A single page index. Shared by every paged listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Page {
    pub page: i32,
}
wire_struct!(Page { page });

/// A client-chosen nonce the server echoes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nonce {
    pub nonce: i64,
}
wire_struct!(Nonce { nonce });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitedLoginBonus {
    pub login_bonus_event_id: i32,
    pub page: i32,
}
wire_struct!(LimitedLoginBonus { login_bonus_event_id, page });

/// A set of mission-set ids plus a page. Shared by the mission queries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MissionInfo {
    pub mission_set_ids: Vec<i32>,
    pub page: i32,
}
wire_struct!(MissionInfo { mission_set_ids, page });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalMessage {
    pub check_message_id: i64,
    pub do_not_show_again: u8,
}
wire_struct!(PersonalMessage { check_message_id, do_not_show_again });

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReceivePresentBox {
    pub present_box_ids: Vec<i64>,
}
wire_struct!(ReceivePresentBox { present_box_ids });

/// Picks the next login-bonus item.
///
/// The payload is a list of item entries followed by a nonce. The entry
/// layout is not known, so the client always sends an empty list; on
/// decode any entries are skipped and the nonce is taken from the last
/// eight bytes of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetNextLoginBonusItem {
    pub nonce: i64,
}

impl Wire for SetNextLoginBonusItem {
    fn encode(&self, dst: &mut impl BufMut) {
        // Empty item list.
        dst.put_u8(0x80);
        dst.put_i64_le(self.nonce);
    }

    fn decode(src: &mut Reader<'_>) -> Result<Self, CodecError> {
        let count = read_vlong(src)?;
        if count < 0 {
            return Err(CodecError::InvalidLength(count));
        }
        let available = src.remaining();
        if available < 8 {
            return Err(CodecError::TruncatedBuffer {
                needed: 8,
                available,
            });
        }
        src.take(available - 8)?;
        let nonce = src.read_i64_le()?;
        Ok(Self { nonce })
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A catalogued command that has no typed request layout.
///
/// Only such commands can travel as [`Request::Opaque`], so an opaque
/// request always decodes back to itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Command", into = "Command")]
pub struct UntypedRequest(pub(crate) Command);

impl UntypedRequest {
    pub fn new(command: Command) -> Option<Self> {
        Self::try_from(command).ok()
    }

    pub fn command(self) -> Command {
        self.0
    }
}

impl TryFrom<Command> for UntypedRequest {
    type Error = TypedCommandError;

    fn try_from(command: Command) -> Result<Self, Self::Error> {
        if Request::has_layout(command) {
            Err(TypedCommandError(command))
        } else {
            Ok(Self(command))
        }
    }
}

impl From<UntypedRequest> for Command {
    fn from(untyped: UntypedRequest) -> Self {
        untyped.0
    }
}

/// The body of one outgoing command.
///
/// The variant determines the command id; see [`Message::command`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    CheckAlive,
    GetVersion,
    GetDataVersion,
    GetHomeInfo,
    GetStoryModeStatusVersion,
    GetPremiumPassStatus,
    GetAvailableVipIdList,
    RequestLogin(RequestLogin),
    Hello(Hello),
    LoginUser(LoginUser),
    GetValue(GetValue),
    GetUserItemAndPoint(Page),
    GetStoryClearCountDay(Page),
    GetMissionSetInfo(Page),
    GetPresentBox(Page),
    CheckNewDay(Nonce),
    GetLimitedLoginBonus(LimitedLoginBonus),
    GetMissionInfo(MissionInfo),
    GetMissionGainInfo(MissionInfo),
    GetPersonalMessage(PersonalMessage),
    ReceivePresentBox(ReceivePresentBox),
    SetNextLoginBonusItem(SetNextLoginBonusItem),

    /// A catalogued command without a typed layout. `body` is the payload
    /// exactly as it appears after the header.
    Opaque { command: UntypedRequest, body: Bytes },
}

impl Message for Request {
    fn command(&self) -> Command {
        match self {
            Self::CheckAlive => Command::CheckAlive,
            Self::GetVersion => Command::GetVersion,
            Self::GetDataVersion => Command::GetDataVersion,
            Self::GetHomeInfo => Command::GetHomeInfo,
            Self::GetStoryModeStatusVersion => Command::GetStoryModeStatusVersion,
            Self::GetPremiumPassStatus => Command::GetPremiumPassStatus,
            Self::GetAvailableVipIdList => Command::GetAvailableVipIdList,
            Self::RequestLogin(_) => Command::RequestLogin,
            Self::Hello(_) => Command::Hello,
            Self::LoginUser(_) => Command::LoginUser,
            Self::GetValue(_) => Command::GetValue,
            Self::GetUserItemAndPoint(_) => Command::GetUserItemAndPoint,
            Self::GetStoryClearCountDay(_) => Command::GetStoryClearCountDay,
            Self::GetMissionSetInfo(_) => Command::GetMissionSetInfo,
            Self::GetPresentBox(_) => Command::GetPresentBox,
            Self::CheckNewDay(_) => Command::CheckNewDay,
            Self::GetLimitedLoginBonus(_) => Command::GetLimitedLoginBonus,
            Self::GetMissionInfo(_) => Command::GetMissionInfo,
            Self::GetMissionGainInfo(_) => Command::GetMissionGainInfo,
            Self::GetPersonalMessage(_) => Command::GetPersonalMessage,
            Self::ReceivePresentBox(_) => Command::ReceivePresentBox,
            Self::SetNextLoginBonusItem(_) => Command::SetNextLoginBonusItem,
            Self::Opaque { command, .. } => command.command(),
        }
    }

    fn encode_body(&self, dst: &mut impl BufMut) {
        match self {
            Self::CheckAlive
            | Self::GetVersion
            | Self::GetDataVersion
            | Self::GetHomeInfo
            | Self::GetStoryModeStatusVersion
            | Self::GetPremiumPassStatus
            | Self::GetAvailableVipIdList => {}
            Self::RequestLogin(p) => p.encode(dst),
            Self::Hello(p) => p.encode(dst),
            Self::LoginUser(p) => p.encode(dst),
            Self::GetValue(p) => p.encode(dst),
            Self::GetUserItemAndPoint(p)
            | Self::GetStoryClearCountDay(p)
            | Self::GetMissionSetInfo(p)
            | Self::GetPresentBox(p) => p.encode(dst),
            Self::CheckNewDay(p) => p.encode(dst),
            Self::GetLimitedLoginBonus(p) => p.encode(dst),
            Self::GetMissionInfo(p) | Self::GetMissionGainInfo(p) => p.encode(dst),
            Self::GetPersonalMessage(p) => p.encode(dst),
            Self::ReceivePresentBox(p) => p.encode(dst),
            Self::SetNextLoginBonusItem(p) => p.encode(dst),
            Self::Opaque { body, .. } => dst.put_slice(body),
        }
    }
}

impl Request {
    /// `true` if `command` has a variant of its own rather than
    /// [`Opaque`](Self::Opaque).
    pub fn has_layout(command: Command) -> bool {
        matches!(
            command,
            Command::CheckAlive
                | Command::GetVersion
                | Command::GetDataVersion
                | Command::GetHomeInfo
                | Command::GetStoryModeStatusVersion
                | Command::GetPremiumPassStatus
                | Command::GetAvailableVipIdList
                | Command::RequestLogin
                | Command::Hello
                | Command::LoginUser
                | Command::GetValue
                | Command::GetUserItemAndPoint
                | Command::GetStoryClearCountDay
                | Command::GetMissionSetInfo
                | Command::GetPresentBox
                | Command::CheckNewDay
                | Command::GetLimitedLoginBonus
                | Command::GetMissionInfo
                | Command::GetMissionGainInfo
                | Command::GetPersonalMessage
                | Command::ReceivePresentBox
                | Command::SetNextLoginBonusItem
        )
    }

    /// An opaque request for `command`.
    ///
    /// # Errors
    /// [`TypedCommandError`] if `command` has a typed variant.
    pub fn opaque(command: Command, body: impl Into<Bytes>) -> Result<Self, TypedCommandError> {
        Ok(Self::Opaque {
            command: UntypedRequest::try_from(command)?,
            body: body.into(),
        })
    }

    /// Encodes a complete packet, header included.
    pub fn encode(&self, sequence: i64) -> Vec<u8> {
        Frame::new(sequence, self).encode()
    }

    /// Encodes just the payload, without the envelope header.
    pub fn body_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_body(&mut out);
        out
    }
}
