//! Static catalog of everything the CLI can ask the TV to do

use crate::service::{resolve_service, ServiceInfo};
use crate::{ApiError, Result};

/// What a command is dispatched to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTarget {
    /// SOAP action on the service with this key
    Service(&'static str),
    /// Verbatim relay to the DIAL launch endpoint
    Dial,
    /// Long-running event listener
    Event,
    /// One-shot SUBSCRIBE registration
    RegisterEvent,
}

/// One entry of the command catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEntry {
    /// Name typed on the command line
    pub name: &'static str,
    pub target: CommandTarget,
    /// SOAP action name, empty for local commands
    pub action: &'static str,
    /// Inner body fragment with `%s` substitution slots
    pub body_template: &'static str,
    /// Number of positional arguments required
    pub arg_count: usize,
}

const fn soap(
    name: &'static str,
    service: &'static str,
    action: &'static str,
    body_template: &'static str,
    arg_count: usize,
) -> CommandEntry {
    CommandEntry {
        name,
        target: CommandTarget::Service(service),
        action,
        body_template,
        arg_count,
    }
}

const fn local(name: &'static str, target: CommandTarget, arg_count: usize) -> CommandEntry {
    CommandEntry {
        name,
        target,
        action: "",
        body_template: "",
        arg_count,
    }
}

/// Every known command, in usage-listing order
pub const COMMANDS: &[CommandEntry] = &[
    soap("set", "dmr2", "SetAVTransportURI", "<InstanceID>0</InstanceID><CurrentURI>%s</CurrentURI><CurrentURIMetaData></CurrentURIMetaData>", 1),
    soap("pl", "dmr2", "Play", "<InstanceID>0</InstanceID><Speed>1</Speed>", 0),
    soap("pa", "dmr2", "Pause", "<InstanceID>0</InstanceID>", 0),
    soap("st", "dmr2", "Stop", "<InstanceID>0</InstanceID>", 0),
    soap("getmedia", "dmr2", "GetMediaInfo", "<InstanceID>0</InstanceID>", 0),
    soap("gettrans", "dmr2", "GetTransportInfo", "<InstanceID>0</InstanceID>", 0),
    soap("getposi", "dmr2", "GetPositionInfo", "<InstanceID>0</InstanceID>", 0),
    soap("getdev", "dmr2", "GetDeviceCapabilities", "<InstanceID>0</InstanceID>", 0),
    soap("getbyte", "dmr2", "X_DLNA_GetBytePositionInfo", "<InstanceID>0</InstanceID>", 0),
    soap("key", "nrc0", "X_SendKey", "<X_KeyEvent>NRC_%s-ONOFF</X_KeyEvent>", 1),
    soap("string", "nrc0", "X_SendString", "<X_String>%s</X_String>", 1),
    soap("getinput", "nrc0", "X_GetInputMode", "", 0),
    soap("getkey", "nrc0", "X_GetKeyboardType", "", 0),
    soap("getevent1", "nrc0", "X_GetEventServerUrl", "", 0),
    soap("getevent2", "dmr0", "X_GetEventServerUrl", "", 0),
    soap("getevent3", "dms0", "X_GetEventServerUrl", "", 0),
    soap("getvect", "nrc0", "X_GetVectorInfo", "", 0),
    soap("getgame", "nrc0", "X_GetGamepadInfo", "", 0),
    soap("getvoice", "nrc0", "X_GetVoiceCtrlInfo", "", 0),
    soap("getapp", "nrc0", "X_GetAppInfo", "<X_InfoType>vc_app</X_InfoType>", 0),
    soap("getapplist", "nrc0", "X_GetAppInfo", "<X_InfoType>vc_app_list</X_InfoType>", 0),
    soap("applist", "nrc0", "X_GetAppList", "", 0),
    soap("queryapp", "nrc0", "X_QueryApp", "<X_AppType>vc_app</X_AppType><X_SessionId>1</X_SessionId><X_QueryKeyword>%s</X_QueryKeyword>", 1),
    soap("launchapp", "nrc0", "X_LaunchApp", "<X_AppType>vc_app</X_AppType><X_LaunchKeyword>%s</X_LaunchKeyword>", 1),
    soap("getvol", "dmr0", "GetVolume", "<InstanceID>0</InstanceID><Channel>Master</Channel>", 0),
    soap("setvol", "dmr0", "SetVolume", "<InstanceID>0</InstanceID><Channel>Master</Channel><DesiredVolume>%s</DesiredVolume>", 1),
    soap("getmute", "dmr0", "GetMute", "<InstanceID>0</InstanceID><Channel>Master</Channel>", 0),
    soap("setmute", "dmr0", "SetMute", "<InstanceID>0</InstanceID><Channel>Master</Channel><DesiredMute>%s</DesiredMute>", 1),
    soap("getprinfo", "dmr1", "GetProtocolInfo", "", 0),
    soap("getconid", "dmr1", "GetCurrentConnectionIDs", "", 0),
    soap("getconinfo", "dmr1", "GetCurrentConnectionInfo", "<ConnectionID>%s</ConnectionID>", 1),
    soap("drivelist", "dms0", "X_DriveList", "<Filter>*</Filter><StartingIndex>0</StartingIndex><RequestedCount>0</RequestedCount>", 0),
    soap("browmeta", "dms0", "Browse", "<ObjectID>%s</ObjectID><BrowseFlag>BrowseMetadata</BrowseFlag><Filter>*</Filter><StartingIndex>0</StartingIndex><RequestedCount>0</RequestedCount><SortCriteria></SortCriteria>", 1),
    soap("browdir", "dms0", "Browse", "<ObjectID>%s</ObjectID><BrowseFlag>BrowseDirectChildren</BrowseFlag><Filter>*</Filter><StartingIndex>0</StartingIndex><RequestedCount>0</RequestedCount><SortCriteria></SortCriteria>", 1),
    soap("createobj", "dms0", "CreateObject", "<ContainerID>0</ContainerID><Elements>%s</Elements>", 1),
    soap("getid", "dms0", "GetSystemUpdateID", "", 0),
    soap("getxid", "dms0", "X_GetSystemUpdateID", "", 0),
    soap("getsort", "dms0", "GetSortCapabilities", "", 0),
    soap("getsearch", "dms0", "GetSearchCapabilities", "", 0),
    local("dial", CommandTarget::Dial, 2),
    local("event", CommandTarget::Event, 1),
    local("regevent", CommandTarget::RegisterEvent, 3),
];

/// Look up a command by name
pub fn resolve_command(name: &str) -> Result<&'static CommandEntry> {
    COMMANDS
        .iter()
        .find(|command| command.name == name)
        .ok_or_else(|| ApiError::UnknownCommand(name.to_string()))
}

/// All command names, for usage text
pub fn command_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|command| command.name)
}

impl CommandEntry {
    /// Service this command's SOAP action is sent to
    pub fn service(&self) -> Result<&'static ServiceInfo> {
        match self.target {
            CommandTarget::Service(key) => resolve_service(key),
            _ => Err(ApiError::NotSoapCommand(self.name.to_string())),
        }
    }

    /// Whether this command is a SOAP action rather than a local mode
    pub fn is_soap(&self) -> bool {
        matches!(self.target, CommandTarget::Service(_))
    }

    /// Fail with `ArgumentCountMismatch` when too few arguments are supplied.
    /// Extra arguments are allowed and ignored by the encoder.
    pub fn check_arity(&self, supplied: usize) -> Result<()> {
        if supplied < self.arg_count {
            return Err(ApiError::ArgumentCountMismatch {
                command: self.name.to_string(),
                expected: self.arg_count,
                supplied,
            });
        }
        Ok(())
    }
}
