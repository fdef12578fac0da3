//! ANSI color utilities and badge rendering for recommendation reports.
//!
//! Badges flag what the score alone doesn't say:
//! - [best]: the top-ranked course, pinned at the suitability ceiling
//! - [no-overlap]: ranked on the collaborator's judgment alone
//! - [unjudged]: the collaborator failed; the score is lexical only
//!
//! Suitability is colored by band so a glance separates strong fits from
//! filler: green at 70%+, yellow at 40%+, red below.

use owo_colors::{OwoColorize, Style};
use std::fmt;

/// Annotations on a recommended course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Badge {
    /// Highest total score in the run
    Best,

    /// No keyword in common with the profile, directly or via expansion
    NoOverlap,

    /// Relevance judgment unavailable; total is lexical only
    Unjudged,
}

impl Badge {
    /// Get the badge label for display
    pub fn label(&self) -> &'static str {
        match self {
            Badge::Best => "best",
            Badge::NoOverlap => "no-overlap",
            Badge::Unjudged => "unjudged",
        }
    }

    /// Get the badge's display color/style
    pub fn style(&self) -> Style {
        match self {
            Badge::Best => Style::new().bright_green().bold(),
            Badge::NoOverlap => Style::new().yellow().dimmed(),
            Badge::Unjudged => Style::new().bright_red(),
        }
    }

    /// Render the badge with color
    pub fn render(&self) -> String {
        format!("[{}]", self.label().style(self.style()))
    }

    /// Render the badge without ANSI codes
    pub fn plain(&self) -> String {
        format!("[{}]", self.label())
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Semantic colors for report elements.
pub struct Colorizer;

impl Colorizer {
    /// Report header lines (bold)
    pub fn header(s: &str) -> String {
        s.bold().to_string()
    }

    /// Course title (bold bright blue)
    pub fn course_title(s: &str) -> String {
        s.bright_blue().bold().to_string()
    }

    /// Suitability percentage, colored by band
    pub fn suitability(percent: u8) -> String {
        let text = format!("{:>3}%", percent);
        match percent {
            70..=u8::MAX => text.green().bold().to_string(),
            40..=69 => text.yellow().to_string(),
            _ => text.red().to_string(),
        }
    }

    /// A keyword matched directly (cyan)
    pub fn direct_match(s: &str) -> String {
        s.cyan().to_string()
    }

    /// A keyword matched through an expansion (magenta)
    pub fn expanded_match(s: &str) -> String {
        s.magenta().to_string()
    }

    /// Collaborator's reason (italic)
    pub fn reason(s: &str) -> String {
        s.italic().to_string()
    }

    /// Colorize badges
    pub fn badge_group(badges: &[Badge]) -> String {
        if badges.is_empty() {
            return String::new();
        }

        let rendered: Vec<_> = badges.iter().map(|b| b.render()).collect();
        rendered.join(" ")
    }

    /// Dim text for secondary information (professor, score breakdown)
    pub fn dim(s: &str) -> String {
        s.dimmed().to_string()
    }
}

/// Colorize one entry of a match list: expanded matches (`term(←seed)`)
/// differ from direct ones.
pub fn colorize_match(term: &str) -> String {
    if term.contains('←') {
        Colorizer::expanded_match(term)
    } else {
        Colorizer::direct_match(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_labels() {
        assert_eq!(Badge::Best.label(), "best");
        assert_eq!(Badge::NoOverlap.label(), "no-overlap");
        assert_eq!(Badge::Unjudged.label(), "unjudged");
    }

    #[test]
    fn test_badge_render() {
        for badge in [Badge::Best, Badge::NoOverlap, Badge::Unjudged] {
            assert!(badge.render().contains(badge.label()));
            assert_eq!(badge.plain(), format!("[{}]", badge.label()));
        }
    }

    #[test]
    fn test_suitability_keeps_number() {
        for p in [0u8, 39, 40, 69, 70, 95] {
            assert!(Colorizer::suitability(p).contains(&format!("{}%", p)));
        }
    }

    #[test]
    fn test_colorize_match() {
        assert!(colorize_match("branding(←marketing)").contains("branding(←marketing)"));
        assert!(colorize_match("marketing").contains("marketing"));
    }
}
