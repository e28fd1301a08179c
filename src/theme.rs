use std::fmt::{self, Display};
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColors {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub background: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    SolarizedLight,
    #[default]
    GithubLight,
    RosePineDawn,
    QuietLight,
    Dracula,
    Gruvbox,
    Nord,
    OneDark,
    Monokai,
    TokyoNight,
}

#[derive(Error, Debug, Clone)]
#[error("unknown theme `{0}`")]
pub struct UnknownTheme(pub String);

impl Theme {
    pub const ALL: [Theme; 10] = [
        Self::SolarizedLight,
        Self::GithubLight,
        Self::RosePineDawn,
        Self::QuietLight,
        Self::Dracula,
        Self::Gruvbox,
        Self::Nord,
        Self::OneDark,
        Self::Monokai,
        Self::TokyoNight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SolarizedLight => "solarizedlight",
            Self::GithubLight => "githublight",
            Self::RosePineDawn => "rosepinedawn",
            Self::QuietLight => "quietlight",
            Self::Dracula => "dracula",
            Self::Gruvbox => "gruvbox",
            Self::Nord => "nord",
            Self::OneDark => "onedark",
            Self::Monokai => "monokai",
            Self::TokyoNight => "tokyonight",
        }
    }

    pub fn colors(&self) -> &'static ThemeColors {
        match self {
            Self::SolarizedLight => &ThemeColors {
                primary: "#268bd2",
                secondary: "#2aa198",
                accent: "#b58900",
                background: "#fdf6e3",
                text: "#657b83",
            },

            Self::GithubLight => &ThemeColors {
                primary: "#0969da",
                secondary: "#6e7781",
                accent: "#d4a72c",
                background: "#ffffff",
                text: "#24292f",
            },

            Self::RosePineDawn => &ThemeColors {
                primary: "#b4637a",
                secondary: "#ea9d34",
                accent: "#56949f",
                background: "#faf4ed",
                text: "#575279",
            },

            Self::QuietLight => &ThemeColors {
                primary: "#6c6c6c",
                secondary: "#b3b3b3",
                accent: "#ffab70",
                background: "#f5f5f5",
                text: "#333333",
            },

            Self::Dracula => &ThemeColors {
                primary: "#bd93f9",
                secondary: "#ff79c6",
                accent: "#50fa7b",
                background: "#282a36",
                text: "#f8f8f2",
            },

            Self::Gruvbox => &ThemeColors {
                primary: "#fabd2f",
                secondary: "#b8bb26",
                accent: "#fe8019",
                background: "#282828",
                text: "#ebdbb2",
            },

            Self::Nord => &ThemeColors {
                primary: "#5e81ac",
                secondary: "#88c0d0",
                accent: "#a3be8c",
                background: "#2e3440",
                text: "#d8dee9",
            },

            Self::OneDark => &ThemeColors {
                primary: "#61afef",
                secondary: "#c678dd",
                accent: "#e5c07b",
                background: "#282c34",
                text: "#abb2bf",
            },

            Self::Monokai => &ThemeColors {
                primary: "#f92672",
                secondary: "#a6e22e",
                accent: "#fd971f",
                background: "#272822",
                text: "#f8f8f2",
            },

            Self::TokyoNight => &ThemeColors {
                primary: "#7aa2f7",
                secondary: "#bb9af7",
                accent: "#7dcfff",
                background: "#1a1b26",
                text: "#c0caf5",
            },
        }
    }
}

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|theme| theme.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownTheme(s.into()))
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        s.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("nord".parse::<Theme>().unwrap(), Theme::Nord);
        assert_eq!("TokyoNight".parse::<Theme>().unwrap(), Theme::TokyoNight);
        assert_eq!("GRUVBOX".parse::<Theme>().unwrap(), Theme::Gruvbox);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "unknownvalue".parse::<Theme>().unwrap_err();
        assert_eq!(err.to_string(), "unknown theme `unknownvalue`");
        assert!("".parse::<Theme>().is_err());
    }

    #[test]
    fn names_round_trip() {
        for theme in Theme::ALL {
            assert_eq!(theme.to_string().parse::<Theme>().unwrap(), theme);
        }
    }

    #[test]
    fn default_is_github_light() {
        let colors = Theme::default().colors();

        assert_eq!(colors.primary, "#0969da");
        assert_eq!(colors.secondary, "#6e7781");
        assert_eq!(colors.accent, "#d4a72c");
        assert_eq!(colors.background, "#ffffff");
        assert_eq!(colors.text, "#24292f");
    }

    #[test]
    fn palettes_are_distinct() {
        for (i, lhs) in Theme::ALL.iter().enumerate() {
            for rhs in &Theme::ALL[i + 1..] {
                assert_ne!(lhs.colors(), rhs.colors(), "{lhs} and {rhs}");
            }
        }
    }
}
