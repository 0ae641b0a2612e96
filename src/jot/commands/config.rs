use crate::commands::{CmdMessage, CmdResult, JotPaths};
use crate::config::{JotConfig, CONFIG_FILENAME};
use crate::error::Result;

pub fn run(config: &JotConfig, paths: &JotPaths) -> Result<CmdResult> {
    let mut result = CmdResult::default().with_config(config.clone());
    result.add_message(CmdMessage::info(format!(
        "Config file: {}",
        paths.home.join(CONFIG_FILENAME).display()
    )));
    Ok(result)
}
