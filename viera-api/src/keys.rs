//! Remote-control key vocabulary accepted by `X_SendKey`

use crate::{ApiError, Result};

/// Known key tokens. `key <TOKEN>` sends `NRC_<TOKEN>-ONOFF`.
pub const KEYS: &[&str] = &[
    "CH_DOWN", "CH_UP", "VOLUP", "VOLDOWN", "MUTE", "TV", "CHG_INPUT", "POWER",
    "RED", "GREEN", "YELLOW", "BLUE", "CANCEL", "SUBMENU", "RETURN", "ENTER",
    "RIGHT", "LEFT", "UP", "DOWN", "MENU", "EPG", "TEXT", "STTL", "INFO", "HOLD",
    "R_TUNE", "REW", "PLAY", "FF", "SKIP", "PAUSE", "STOP", "REC",
    "D0", "D1", "D2", "D3", "D4", "D5", "D6", "D7", "D8", "D9",
    "HDMI1", "HDMI2", "HDMI3", "APPS", "AD_CHANGE", "CHAT_MODE", "DISP_MODE",
    "DMS_CH_DOWN", "DMS_CH_UP", "GUIDE", "HOME", "INDEX", "INTERNET", "NETFLIX",
    "MIC_NRC", "MPX", "MYBUTTON", "OFFTIMER", "OSD_REMOTE", "PICTAI", "P_NR",
    "SD_CARD", "SKIP_NEXT", "SKIP_PREV", "SURROUND", "SWAP", "TV_MUTE_ON",
    "TV_MUTE_OFF", "VIERA_LINK", "VIDEO1", "VTOOLS",
];

/// Whether `token` is a known key
pub fn is_known_key(token: &str) -> bool {
    KEYS.contains(&token)
}

/// Comma-separated list of every key
pub fn key_list() -> String {
    KEYS.join(",")
}

/// Validate a key token, reporting the full vocabulary when it is unknown
pub fn check_key(token: &str) -> Result<()> {
    if is_known_key(token) {
        Ok(())
    } else {
        Err(ApiError::UnknownKey {
            key: token.to_string(),
            valid: key_list(),
        })
    }
}
