use crate::api::ExportFormat;
use crate::viewer::state::{MAX_SPEED_LEVEL, MIN_SPEED_LEVEL};

pub const HELP: &str = "\
Commands:
  <text>              describe a model (or a change to the current one)
  /new                start a new chat
  /wireframe          toggle wireframe
  /grid               toggle ground grid
  /rotate             toggle auto-rotation
  /speed <1-10>       auto-rotation speed
  /reset              reset camera
  /download glb|obj   save the current model
  /health             check the backend
  /help               show this help
  /quit               exit";

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Prompt(String),
    NewChat,
    ToggleWireframe,
    ToggleGrid,
    ToggleAutoRotate,
    RotateSpeed(u8),
    ResetCamera,
    Download(ExportFormat),
    Health,
    Help,
    Quit,
}

impl Command {
    /// Parses a line; `None` for blank input.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Some(Command::Prompt(line.to_string())));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default().to_ascii_lowercase();
        let arg = parts.next();

        let command = match name.as_str() {
            "new" => Command::NewChat,
            "wireframe" | "w" => Command::ToggleWireframe,
            "grid" | "g" => Command::ToggleGrid,
            "rotate" | "r" => Command::ToggleAutoRotate,
            "speed" => Command::RotateSpeed(parse_speed(arg)?),
            "reset" => Command::ResetCamera,
            "download" | "save" => Command::Download(parse_format(arg)?),
            "health" => Command::Health,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("Unknown command: /{}", other)),
        };
        Ok(Some(command))
    }
}

fn parse_speed(arg: Option<&str>) -> Result<u8, String> {
    let usage = || format!("Usage: /speed <{}-{}>", MIN_SPEED_LEVEL, MAX_SPEED_LEVEL);
    let level: u8 = arg.ok_or_else(usage)?.parse().map_err(|_| usage())?;
    if !(MIN_SPEED_LEVEL..=MAX_SPEED_LEVEL).contains(&level) {
        return Err(usage());
    }
    Ok(level)
}

fn parse_format(arg: Option<&str>) -> Result<ExportFormat, String> {
    match arg.map(str::to_ascii_lowercase).as_deref() {
        Some("glb") | None => Ok(ExportFormat::Glb),
        Some("obj") => Ok(ExportFormat::Obj),
        Some(other) => Err(format!("Unknown format '{}', expected glb or obj", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_prompt() {
        assert_eq!(
            Command::parse("  a red cube \n").unwrap(),
            Some(Command::Prompt("a red cube".to_string()))
        );
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn slash_commands() {
        assert_eq!(Command::parse("/new").unwrap(), Some(Command::NewChat));
        assert_eq!(Command::parse("/GRID").unwrap(), Some(Command::ToggleGrid));
        assert_eq!(Command::parse("/speed 7").unwrap(), Some(Command::RotateSpeed(7)));
        assert_eq!(
            Command::parse("/download obj").unwrap(),
            Some(Command::Download(ExportFormat::Obj))
        );
        assert_eq!(
            Command::parse("/download").unwrap(),
            Some(Command::Download(ExportFormat::Glb))
        );
        assert_eq!(Command::parse("/q").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(Command::parse("/speed").is_err());
        assert!(Command::parse("/speed 11").is_err());
        assert!(Command::parse("/speed fast").is_err());
        assert!(Command::parse("/download stl").is_err());
        assert!(Command::parse("/teleport").is_err());
    }
}
