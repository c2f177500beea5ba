//! Command identifiers.
//!
//! Every message on the wire starts with a 16-bit command id that selects
//! the payload layout. [`CommandId`] is the raw number as read off the
//! wire and may be anything. [`Command`] is the closed set of ids this
//! client knows about; converting one into the other is where "unknown
//! command" is decided.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A raw 16-bit command id, exactly as it appears in the envelope header.
///
/// Displays as `CheckNewDay(4113)`, or `#65535` for an id outside the
/// catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(pub u16);

impl CommandId {
    /// The catalogued command for this id, if there is one.
    pub fn command(self) -> Option<Command> {
        Command::from_id(self)
    }
}

impl From<u16> for CommandId {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Command> for CommandId {
    fn from(command: Command) -> Self {
        command.id()
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.command() {
            Some(command) => write!(f, "{}({})", command.name(), self.0),
            None => write!(f, "#{}", self.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Command catalogue
// ---------------------------------------------------------------------------

/// Declares [`Command`] together with its id and name lookups.
macro_rules! commands {
    ($($name:ident = $id:literal,)*) => {
        /// Every command id the client knows about.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(u16)]
        pub enum Command {
            $($name = $id,)*
        }

        impl Command {
            /// All catalogued commands, in declaration order.
            pub const ALL: &'static [Command] = &[$(Command::$name,)*];

            /// Looks up a command by its wire id.
            pub fn from_id(id: CommandId) -> Option<Self> {
                match id.0 {
                    $($id => Some(Self::$name),)*
                    _ => None,
                }
            }

            /// The command's name, as used in logs.
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)*
                }
            }
        }
    };
}

commands! {
    RequestLogin = 0,
    Hello = 1,
    RequestLoginId = 3,
    SendCapyVerification = 5,
    CheckAlive = 144,
    CreateUser = 4096,
    GetVersion = 4097,
    GetUserCharacter = 4101,
    GetUserItemAndPoint = 4108,
    GetValue = 4109,
    SetValue = 4110,
    GetParty = 4112,
    CheckNewDay = 4113,
    SetNextLoginBonusItem = 4114,
    LoginUser = 4119,
    GetLimitedLoginBonus = 4120,
    GetDataVersion = 4138,
    GetHomeInfo = 4353,
    GetPresentBox = 4354,
    ReceivePresentBox = 4355,
    UpdateUserName = 4358,
    GetPersonalMessage = 4370,
    GetResultStoryBattle = 4432,
    GetStoryInfo = 4433,
    PlayStoryBattle = 4434,
    RecoverStamina = 4438,
    GetStoryModeStatus = 4440,
    PlayTotalBattle = 4441,
    GetResultTotalBattle = 4442,
    GetTotalBattleLevelList = 4444,
    GetTotalBattleLevelInfo = 4445,
    GetTotalBattleLayerInfo = 4446,
    GetStoryModeStatusVersion = 4448,
    GetStoryClearCountDay = 4449,
    ExecuteGasha = 4688,
    GetGashaInfo = 4689,
    UpdatePartyInfo = 4865,
    UnlockBoostPanel = 4867,
    UnlockBoostBoard = 4868,
    UnlockBoostBoardBulk = 4883,
    GetAvailableVipIdList = 5385,
    GetPremiumPassStatus = 5393,
    GetMissionSetInfo = 5457,
    GetMissionInfo = 5458,
    GetMissionReward = 5459,
    GetCompletedMission = 5460,
    GetMissionGainInfo = 5463,
}

impl Command {
    /// The wire id of this command.
    pub fn id(self) -> CommandId {
        CommandId(self as u16)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_ids_round_trip_through_catalogue() {
        for &command in Command::ALL {
            assert_eq!(Command::from_id(command.id()), Some(command));
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<u16> = Command::ALL.iter().map(|c| c.id().0).collect();
        assert_eq!(ids.len(), Command::ALL.len());
    }

    #[test]
    fn test_known_ids() {
        assert_eq!(Command::CheckAlive.id(), CommandId(144));
        assert_eq!(Command::CheckNewDay.id(), CommandId(4113));
        assert_eq!(Command::GetMissionGainInfo.id(), CommandId(5463));
    }

    #[test]
    fn test_unknown_id_has_no_command() {
        assert_eq!(CommandId(0xFFFF).command(), None);
        assert_eq!(CommandId(2).command(), None);
    }

    #[test]
    fn test_command_id_display() {
        assert_eq!(CommandId(4113).to_string(), "CheckNewDay(4113)");
        assert_eq!(CommandId(0xFFFF).to_string(), "#65535");
    }

    #[test]
    fn test_command_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&CommandId(144)).unwrap();
        assert_eq!(json, "144");
    }
}
