// ABOUTME: Builds metadata purely from the URL when no page could be fetched.
// ABOUTME: Known hosts get fixed titles; others get a title-cased last path segment or the bare hostname.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::ExtractError;
use crate::extractors::workout::week_duration_in_url;
use crate::result::SiteMetadata;

/// Title used when the URL cannot be parsed.
pub const LAST_RESORT_TITLE: &str = "Content from URL";

static WORD_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w").expect("valid regex"));
static PAGE_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(html|php|aspx?)$").expect("valid regex"));

/// Upper-cases the first character of every word.
pub fn title_case(text: &str) -> String {
    WORD_START
        .replace_all(text, |caps: &regex::Captures| caps[0].to_uppercase())
        .into_owned()
}

fn last_segment(url: &Url) -> Option<&str> {
    url.path_segments()?.filter(|s| !s.is_empty()).last()
}

/// Metadata derived from the URL alone. Never fails.
///
/// `domain` is the hostname (empty when the URL does not parse) and `used_proxy` is empty.
pub fn fallback_from_url(url: &str) -> SiteMetadata {
    match Url::parse(url) {
        Ok(parsed) => from_parsed(url, &parsed),
        Err(e) => {
            let err = ExtractError::invalid_url(url, "fallback", Some(e.into()));
            tracing::debug!(error = %err, "using last-resort metadata");
            SiteMetadata {
                title: LAST_RESORT_TITLE.to_string(),
                description: Some(String::new()),
                ..Default::default()
            }
        }
    }
}

fn from_parsed(url: &str, parsed: &Url) -> SiteMetadata {
    let host = parsed.host_str().unwrap_or_default().to_string();
    let mut duration = None;

    let (title, description) = if host.contains("youtube") {
        (
            "YouTube Workout Video".to_string(),
            "Workout video from YouTube".to_string(),
        )
    } else if host.contains("muscleandstrength") {
        duration = week_duration_in_url(url);
        let title = last_segment(parsed)
            .map(|s| title_case(&s.replace('-', " ")))
            .unwrap_or_default();
        let description = if url.contains("transformation") {
            "Total body transformation workout program from Muscle & Strength"
        } else if url.contains("muscle") {
            "Muscle building workout from Muscle & Strength"
        } else if url.contains("strength") {
            "Strength training program from Muscle & Strength"
        } else {
            "Workout program from Muscle & Strength"
        };
        (title, description.to_string())
    } else if host.contains("bodybuilding") {
        (
            "Bodybuilding.com Workout".to_string(),
            "Workout program from Bodybuilding.com".to_string(),
        )
    } else if host.contains("allrecipes") {
        (
            "Recipe from AllRecipes".to_string(),
            "Recipe from AllRecipes.com".to_string(),
        )
    } else if host.contains("food") {
        ("Recipe".to_string(), "Recipe from cooking website".to_string())
    } else if host.contains("fitness") || host.contains("workout") {
        (
            "Fitness Workout".to_string(),
            "Workout from fitness website".to_string(),
        )
    } else {
        let title = match last_segment(parsed) {
            Some(segment) => {
                let spaced = segment.replace(['-', '_'], " ");
                title_case(&PAGE_EXTENSION.replace(&spaced, ""))
            }
            None => host.replacen("www.", "", 1),
        };
        (title, format!("Content from {host}"))
    };

    let title = if title.trim().is_empty() {
        LAST_RESORT_TITLE.to_string()
    } else {
        title
    };

    SiteMetadata {
        title,
        description: Some(description),
        duration,
        domain: host,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn muscle_and_strength_program() {
        let meta =
            fallback_from_url("https://www.muscleandstrength.com/workouts/12-week-total-transformation");
        assert_eq!(meta.title, "12 Week Total Transformation");
        assert_eq!(meta.duration.as_deref(), Some("12 weeks"));
        assert_eq!(
            meta.description.as_deref(),
            Some("Total body transformation workout program from Muscle & Strength")
        );
        assert_eq!(meta.domain, "www.muscleandstrength.com");
        assert_eq!(meta.used_proxy, "");
    }

    #[test]
    fn known_hosts() {
        assert_eq!(fallback_from_url("https://www.youtube.com/watch?v=x").title, "YouTube Workout Video");
        assert_eq!(
            fallback_from_url("https://www.allrecipes.com/recipe/1/").title,
            "Recipe from AllRecipes"
        );
        assert_eq!(fallback_from_url("https://www.foodnetwork.com/x").title, "Recipe");
        assert_eq!(
            fallback_from_url("https://www.bodybuilding.com/content/x.html").title,
            "Bodybuilding.com Workout"
        );
        assert_eq!(fallback_from_url("https://fitnessblue.example/p").title, "Fitness Workout");
    }

    #[test]
    fn generic_path_segment() {
        let meta = fallback_from_url("https://blog.example.com/posts/my_best-post.html");
        assert_eq!(meta.title, "My Best Post");
        assert_eq!(meta.description.as_deref(), Some("Content from blog.example.com"));
    }

    #[test]
    fn bare_host() {
        let meta = fallback_from_url("https://www.example.com/");
        assert_eq!(meta.title, "example.com");
        assert_eq!(meta.description.as_deref(), Some("Content from www.example.com"));
    }

    #[test]
    fn unparseable_url() {
        let meta = fallback_from_url("not a url");
        assert_eq!(meta.title, LAST_RESORT_TITLE);
        assert_eq!(meta.description.as_deref(), Some(""));
        assert_eq!(meta.domain, "");
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("push pull legs"), "Push Pull Legs");
    }
}
