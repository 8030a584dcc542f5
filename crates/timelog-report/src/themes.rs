use crossterm::style::{Attribute, Color, ContentStyle, Stylize};
use crossterm::tty::IsTty;

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Detect the terminal background from `COLORFGBG` (`"fg;bg"`).
///
/// Background values 0-6 are dark, 7-15 light. Absent or unparseable values
/// count as dark.
pub fn detect_background() -> BackgroundType {
    background_from(std::env::var("COLORFGBG").ok().as_deref())
}

fn background_from(colorfgbg: Option<&str>) -> BackgroundType {
    colorfgbg
        .and_then(|val| val.split(';').next_back())
        .and_then(|bg| bg.parse::<u8>().ok())
        .map_or(BackgroundType::Dark, |bg| {
            if bg <= 6 {
                BackgroundType::Dark
            } else {
                BackgroundType::Light
            }
        })
}

/// Styles used by the text report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// Section titles ("Months", "Weeks", ...).
    pub heading: ContentStyle,
    pub rule: ContentStyle,
    /// Bucket labels in the first column.
    pub label: ContentStyle,
    /// Hour figures.
    pub value: ContentStyle,
    pub dim: ContentStyle,
    pub total: ContentStyle,
    /// The longest-session line.
    pub highlight: ContentStyle,
    /// Placeholders such as "no sessions recorded".
    pub warning: ContentStyle,
}

fn fg(color: Color) -> ContentStyle {
    ContentStyle::new().with(color)
}

fn bold(color: Color) -> ContentStyle {
    fg(color).attribute(Attribute::Bold)
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            heading: bold(Color::Cyan),
            rule: fg(Color::DarkGrey),
            label: fg(Color::Grey),
            value: bold(Color::White),
            dim: fg(Color::DarkGrey),
            total: bold(Color::Yellow),
            highlight: fg(Color::Green),
            warning: fg(Color::Yellow),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            heading: bold(Color::Blue),
            rule: fg(Color::Grey),
            label: fg(Color::DarkGrey),
            value: bold(Color::Black),
            dim: fg(Color::Grey),
            total: bold(Color::Magenta),
            highlight: fg(Color::DarkGreen),
            warning: fg(Color::DarkYellow),
        }
    }

    /// Basic 8-colour ANSI palette without bold.
    pub fn classic() -> Self {
        Self {
            heading: fg(Color::Cyan),
            rule: fg(Color::DarkGrey),
            label: fg(Color::White),
            value: fg(Color::White),
            dim: fg(Color::DarkGrey),
            total: fg(Color::Yellow),
            highlight: fg(Color::Green),
            warning: fg(Color::Yellow),
        }
    }

    /// No styling at all; used when output is not a terminal.
    pub fn plain() -> Self {
        let none = ContentStyle::new();
        Self {
            heading: none,
            rule: none,
            label: none,
            value: none,
            dim: none,
            total: none,
            highlight: none,
            warning: none,
        }
    }

    /// Choose a theme from the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark => Self::dark(),
        }
    }

    /// Construct a theme by name. Unknown names auto-detect.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    /// Like [`Theme::from_name`], but plain when stdout is not a terminal.
    pub fn for_stdout(name: &str) -> Self {
        if std::io::stdout().is_tty() {
            Self::from_name(name)
        } else {
            Self::plain()
        }
    }

    /// Apply `style` to `text`, emitting no escape codes for an empty style.
    pub fn paint(style: ContentStyle, text: &str) -> String {
        if style == ContentStyle::new() {
            text.to_string()
        } else {
            style.apply(text).to_string()
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Theme construction ───────────────────────────────────────────────────

    #[test]
    fn test_dark_theme_creation() {
        let t = Theme::dark();
        assert_eq!(t.heading.foreground_color, Some(Color::Cyan));
        assert!(t.heading.attributes.has(Attribute::Bold));
        assert_eq!(t.total.foreground_color, Some(Color::Yellow));
    }

    #[test]
    fn test_light_theme_creation() {
        let t = Theme::light();
        assert_eq!(t.heading.foreground_color, Some(Color::Blue));
        assert_eq!(t.value.foreground_color, Some(Color::Black));
    }

    #[test]
    fn test_classic_theme_has_no_bold() {
        let t = Theme::classic();
        assert!(!t.heading.attributes.has(Attribute::Bold));
        assert!(!t.value.attributes.has(Attribute::Bold));
        assert!(!t.total.attributes.has(Attribute::Bold));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Theme::from_name("dark"), Theme::dark());
        assert_eq!(Theme::from_name("light"), Theme::light());
        assert_eq!(Theme::from_name("classic"), Theme::classic());
    }

    #[test]
    fn test_from_name_unknown_falls_back() {
        let t = Theme::from_name("does-not-exist");
        assert!(t.heading.foreground_color.is_some());
    }

    // ── Background detection ─────────────────────────────────────────────────

    #[test]
    fn test_background_from_colorfgbg() {
        assert_eq!(background_from(Some("15;0")), BackgroundType::Dark);
        assert_eq!(background_from(Some("0;15")), BackgroundType::Light);
        assert_eq!(background_from(Some("0;default;7")), BackgroundType::Light);
        assert_eq!(background_from(Some("garbage")), BackgroundType::Dark);
        assert_eq!(background_from(None), BackgroundType::Dark);
    }

    // ── paint ────────────────────────────────────────────────────────────────

    #[test]
    fn test_paint_plain_is_verbatim() {
        assert_eq!(Theme::paint(Theme::plain().heading, "Months"), "Months");
    }

    #[test]
    fn test_paint_styled_wraps_text() {
        let painted = Theme::paint(Theme::dark().heading, "Months");
        assert!(painted.contains("Months"));
        assert!(painted.starts_with('\u{1b}'));
    }
}
