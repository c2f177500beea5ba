//! The command registry: which decoder handles which command id.
//!
//! Built once on first use and read-only afterwards, so lookups need no
//! locking. Every catalogued [`Command`] has an entry; commands without a
//! typed layout get the opaque decoders. An id outside the catalogue has no
//! entry at all, which is how [`ProtocolError::UnknownCommand`] arises.
//!
//! [`ProtocolError::UnknownCommand`]: crate::ProtocolError::UnknownCommand

use std::collections::HashMap;
use std::sync::LazyLock;

use bytes::Bytes;
use vlwire_codec::{CodecError, Reader, Wire};

use crate::request::{
    GetValue, Hello, LimitedLoginBonus, LoginUser, MissionInfo, Nonce, Page, PersonalMessage,
    ReceivePresentBox, RequestLogin, SetNextLoginBonusItem, UntypedRequest,
};
use crate::response::{
    MissionSetInfoPage, NewDayStatus, PresentBoxPage, ReceivedPresents, ResponseBody,
    UntypedResponse,
};
use crate::{Command, CommandId, Request};

/// Decodes a request payload (everything after the header).
pub type RequestDecoder = fn(Command, &mut Reader<'_>) -> Result<Request, CodecError>;

/// Decodes the command-specific tail of a response, after the common prefix.
pub type ResponseDecoder = fn(Command, &mut Reader<'_>) -> Result<ResponseBody, CodecError>;

/// The decoders registered for one command.
#[derive(Debug, Clone, Copy)]
pub struct RegistryEntry {
    pub command: Command,
    request: RequestDecoder,
    response: ResponseDecoder,
}

impl RegistryEntry {
    pub fn decode_request(&self, src: &mut Reader<'_>) -> Result<Request, CodecError> {
        (self.request)(self.command, src)
    }

    pub fn decode_response(&self, src: &mut Reader<'_>) -> Result<ResponseBody, CodecError> {
        (self.response)(self.command, src)
    }
}

/// An immutable map from command id to [`RegistryEntry`].
#[derive(Debug)]
pub struct Registry {
    entries: HashMap<u16, RegistryEntry>,
}

static BUILTIN: LazyLock<Registry> = LazyLock::new(Registry::builtin);

impl Registry {
    /// The process-wide registry with every catalogued command.
    pub fn global() -> &'static Registry {
        &BUILTIN
    }

    /// Builds a fresh registry covering [`Command::ALL`].
    pub fn builtin() -> Self {
        let entries = Command::ALL
            .iter()
            .map(|&command| {
                let entry = RegistryEntry {
                    command,
                    request: request_decoder(command),
                    response: response_decoder(command),
                };
                (command.id().0, entry)
            })
            .collect();
        Self { entries }
    }

    pub fn lookup(&self, id: CommandId) -> Option<&RegistryEntry> {
        self.entries.get(&id.0)
    }

    pub fn contains(&self, id: CommandId) -> bool {
        self.entries.contains_key(&id.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Decoder tables
// ---------------------------------------------------------------------------

fn request_decoder(command: Command) -> RequestDecoder {
    match command {
        Command::CheckAlive => |_, _| Ok(Request::CheckAlive),
        Command::GetVersion => |_, _| Ok(Request::GetVersion),
        Command::GetDataVersion => |_, _| Ok(Request::GetDataVersion),
        Command::GetHomeInfo => |_, _| Ok(Request::GetHomeInfo),
        Command::GetStoryModeStatusVersion => |_, _| Ok(Request::GetStoryModeStatusVersion),
        Command::GetPremiumPassStatus => |_, _| Ok(Request::GetPremiumPassStatus),
        Command::GetAvailableVipIdList => |_, _| Ok(Request::GetAvailableVipIdList),
        Command::RequestLogin => |_, r| RequestLogin::decode(r).map(Request::RequestLogin),
        Command::Hello => |_, r| Hello::decode(r).map(Request::Hello),
        Command::LoginUser => |_, r| LoginUser::decode(r).map(Request::LoginUser),
        Command::GetValue => |_, r| GetValue::decode(r).map(Request::GetValue),
        Command::GetUserItemAndPoint => |_, r| Page::decode(r).map(Request::GetUserItemAndPoint),
        Command::GetStoryClearCountDay => {
            |_, r| Page::decode(r).map(Request::GetStoryClearCountDay)
        }
        Command::GetMissionSetInfo => |_, r| Page::decode(r).map(Request::GetMissionSetInfo),
        Command::GetPresentBox => |_, r| Page::decode(r).map(Request::GetPresentBox),
        Command::CheckNewDay => |_, r| Nonce::decode(r).map(Request::CheckNewDay),
        Command::GetLimitedLoginBonus => {
            |_, r| LimitedLoginBonus::decode(r).map(Request::GetLimitedLoginBonus)
        }
        Command::GetMissionInfo => |_, r| MissionInfo::decode(r).map(Request::GetMissionInfo),
        Command::GetMissionGainInfo => {
            |_, r| MissionInfo::decode(r).map(Request::GetMissionGainInfo)
        }
        Command::GetPersonalMessage => {
            |_, r| PersonalMessage::decode(r).map(Request::GetPersonalMessage)
        }
        Command::ReceivePresentBox => {
            |_, r| ReceivePresentBox::decode(r).map(Request::ReceivePresentBox)
        }
        Command::SetNextLoginBonusItem => {
            |_, r| SetNextLoginBonusItem::decode(r).map(Request::SetNextLoginBonusItem)
        }
        _ => opaque_request,
    }
}

fn opaque_request(command: Command, r: &mut Reader<'_>) -> Result<Request, CodecError> {
    Ok(Request::Opaque {
        command: UntypedRequest(command),
        body: Bytes::copy_from_slice(r.take_rest()),
    })
}

fn response_decoder(command: Command) -> ResponseDecoder {
    match command {
        Command::CheckAlive => |_, _| Ok(ResponseBody::CheckAlive),
        Command::SetNextLoginBonusItem => |_, _| Ok(ResponseBody::SetNextLoginBonusItem),
        Command::CheckNewDay => |_, r| NewDayStatus::decode(r).map(ResponseBody::CheckNewDay),
        Command::GetPresentBox => {
            |_, r| PresentBoxPage::decode(r).map(ResponseBody::GetPresentBox)
        }
        Command::ReceivePresentBox => {
            |_, r| ReceivedPresents::decode(r).map(ResponseBody::ReceivePresentBox)
        }
        Command::GetMissionSetInfo => {
            |_, r| MissionSetInfoPage::decode(r).map(ResponseBody::GetMissionSetInfo)
        }
        _ => opaque_response,
    }
}

fn opaque_response(command: Command, r: &mut Reader<'_>) -> Result<ResponseBody, CodecError> {
    Ok(ResponseBody::Opaque {
        command: UntypedResponse(command),
        body: Bytes::copy_from_slice(r.take_rest()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_catalogued_command_is_registered() {
        let registry = Registry::global();
        assert_eq!(registry.len(), Command::ALL.len());
        for &command in Command::ALL {
            let entry = registry.lookup(command.id()).unwrap();
            assert_eq!(entry.command, command);
        }
    }

    #[test]
    fn test_unknown_id_is_not_registered() {
        assert!(!Registry::global().contains(CommandId(0xFFFF)));
        assert!(Registry::global().lookup(CommandId(2)).is_none());
    }

    #[test]
    fn test_typed_request_decoder_is_selected() {
        let entry = Registry::global().lookup(CommandId(4113)).unwrap();
        let body = 5i64.to_le_bytes();
        let req = entry.decode_request(&mut Reader::new(&body)).unwrap();
        assert_eq!(req, Request::CheckNewDay(Nonce { nonce: 5 }));
    }

    #[test]
    fn test_shared_layout_keeps_its_own_variant() {
        let body = 4i32.to_le_bytes();
        let entry = Registry::global()
            .lookup(Command::GetStoryClearCountDay.id())
            .unwrap();
        assert_eq!(
            entry.decode_request(&mut Reader::new(&body)).unwrap(),
            Request::GetStoryClearCountDay(Page { page: 4 })
        );
    }

    #[test]
    fn test_untyped_command_decodes_opaque() {
        let entry = Registry::global().lookup(Command::GetParty.id()).unwrap();
        let mut r = Reader::new(&[9, 8, 7]);
        assert_eq!(
            entry.decode_request(&mut r).unwrap(),
            Request::opaque(Command::GetParty, vec![9u8, 8, 7]).unwrap()
        );
        assert!(r.is_empty());
    }

    #[test]
    fn test_opaque_request_decoder_matches_untyped_commands() {
        for &command in Command::ALL {
            let entry = Registry::global().lookup(command.id()).unwrap();
            let decoded = entry.decode_request(&mut Reader::new(&[]));
            let is_opaque = matches!(decoded, Ok(Request::Opaque { .. }));
            assert_eq!(is_opaque, !Request::has_layout(command), "{command}");
        }
    }

    #[test]
    fn test_opaque_response_decoder_matches_untyped_commands() {
        for &command in Command::ALL {
            let entry = Registry::global().lookup(command.id()).unwrap();
            let decoded = entry.decode_response(&mut Reader::new(&[]));
            let is_opaque = matches!(decoded, Ok(ResponseBody::Opaque { .. }));
            assert_eq!(is_opaque, !ResponseBody::has_layout(command), "{command}");
        }
    }

    #[test]
    fn test_typed_response_decoders_are_selected() {
        let entry = Registry::global().lookup(Command::CheckNewDay.id()).unwrap();
        let body = [0, 1, 0, 0, 0, 1, 0, 0, 0];
        assert!(matches!(
            entry.decode_response(&mut Reader::new(&body)),
            Ok(ResponseBody::CheckNewDay(_))
        ));

        let entry = Registry::global()
            .lookup(Command::ReceivePresentBox.id())
            .unwrap();
        assert!(matches!(
            entry.decode_response(&mut Reader::new(&[])),
            Err(CodecError::TruncatedBuffer { .. })
        ));
    }

    #[test]
    fn test_empty_request_consumes_nothing() {
        let entry = Registry::global().lookup(Command::CheckAlive.id()).unwrap();
        let mut r = Reader::new(&[]);
        assert_eq!(entry.decode_request(&mut r).unwrap(), Request::CheckAlive);
    }
}
