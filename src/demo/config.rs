//! Scribble strips configuration file.
//!
//! A JSON array of strip settings:
//!
//! ```json
//! [
//!   { "stripIndex": 0, "topText": "Drums", "bottomText": "Kick",
//!     "topContrast": "dark", "bottomContrast": "light", "backgroundColor": "cyan" }
//! ]
//! ```

use anyhow::{bail, Context};
use serde::Deserialize;
use std::{fs, io, path::Path};

use xtouch_extender::ctrl_surf::{BackgroundColor, ControlSurface, Mode, TextColor};

#[derive(Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct StripSettings {
    pub strip_index: i64,
    pub top_text: String,
    pub bottom_text: String,
    pub top_contrast: String,
    pub bottom_contrast: String,
    pub background_color: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StripColors {
    pub top_text: TextColor,
    pub bottom_text: TextColor,
    pub background: BackgroundColor,
}

impl StripSettings {
    /// Resolves the color names.
    ///
    /// A `black` background is rendered as `white` with inverted contrasts,
    /// since dark text is barely visible on the device's black background.
    pub fn colors(&self) -> anyhow::Result<StripColors> {
        let contrast = |name: &str| match name {
            "dark" => TextColor::Dark,
            _ => TextColor::Light,
        };
        let inverted = |name: &str| match name {
            "light" => TextColor::Dark,
            _ => TextColor::Light,
        };

        use BackgroundColor::*;
        let background = match self.background_color.as_str() {
            "black" => {
                return Ok(StripColors {
                    top_text: inverted(&self.top_contrast),
                    bottom_text: inverted(&self.bottom_contrast),
                    background: White,
                });
            }
            "" => Black,
            "white" => White,
            "red" => Red,
            "green" => Green,
            "yellow" => Yellow,
            "blue" => Blue,
            "magenta" => Magenta,
            "cyan" => Cyan,
            other => bail!(
                "Unknown background color {other:?} for strip {}",
                self.strip_index
            ),
        };

        Ok(StripColors {
            top_text: contrast(&self.top_contrast),
            bottom_text: contrast(&self.bottom_contrast),
            background,
        })
    }

    pub fn apply<M: Mode>(&self, surface: &ControlSurface<M>) -> anyhow::Result<()> {
        let colors = self.colors()?;
        let strip = surface.scribble_strip(self.strip_index)?;

        strip.set_top_text(self.top_text.as_str())?;
        strip.set_bottom_text(self.bottom_text.as_str())?;
        strip.set_top_text_color(colors.top_text)?;
        strip.set_bottom_text_color(colors.bottom_text)?;
        strip.set_background_color(colors.background)?;

        Ok(())
    }
}

pub fn parse(json: &str) -> anyhow::Result<Vec<StripSettings>> {
    serde_json::from_str(json).context("Invalid scribble strips configuration")
}

/// Loads the configuration at `path`, `None` if there is no such file.
pub fn load(path: &Path) -> anyhow::Result<Option<Vec<StripSettings>>> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::warn!("No scribble strips configuration at {}", path.display());
            return Ok(None);
        }
        Err(err) => {
            return Err(err).with_context(|| format!("Couldn't read {}", path.display()));
        }
    };

    parse(&json)
        .with_context(|| format!("Loading {}", path.display()))
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_strips() {
        let settings = parse(
            r#"[
                {
                    "stripIndex": 2,
                    "topText": "Vocals",
                    "bottomText": "Lead",
                    "topContrast": "dark",
                    "bottomContrast": "light",
                    "backgroundColor": "yellow",
                    "comment": "ignored"
                },
                { "stripIndex": 3 }
            ]"#,
        )
        .unwrap();

        assert_eq!(settings.len(), 2);
        assert_eq!(settings[0].top_text, "Vocals");
        assert_eq!(
            settings[0].colors().unwrap(),
            StripColors {
                top_text: TextColor::Dark,
                bottom_text: TextColor::Light,
                background: BackgroundColor::Yellow,
            },
        );

        assert_eq!(
            settings[1],
            StripSettings {
                strip_index: 3,
                ..Default::default()
            },
        );
        assert_eq!(
            settings[1].colors().unwrap(),
            StripColors {
                top_text: TextColor::Light,
                bottom_text: TextColor::Light,
                background: BackgroundColor::Black,
            },
        );
    }

    #[test]
    fn black_inverts_contrast() {
        let settings = StripSettings {
            top_contrast: "light".to_string(),
            bottom_contrast: "dark".to_string(),
            background_color: "black".to_string(),
            ..Default::default()
        };

        assert_eq!(
            settings.colors().unwrap(),
            StripColors {
                top_text: TextColor::Dark,
                bottom_text: TextColor::Light,
                background: BackgroundColor::White,
            },
        );
    }

    #[test]
    fn unknown_color() {
        let settings = StripSettings {
            background_color: "purple".to_string(),
            ..Default::default()
        };
        assert!(settings.colors().is_err());
    }

    #[test]
    fn missing_file() {
        assert!(load(Path::new("does/not/exist.json")).unwrap().is_none());
    }
}
