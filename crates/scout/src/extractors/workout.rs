// ABOUTME: Workout section detection: exercise tables with their headings, workout containers, and exercise lists.
// ABOUTME: Also derives fitness-page fields (duration, difficulty, category) for the aggregator.

//! Workout table parser.
//!
//! Sections are found in three passes, each used only when the previous one
//! found nothing:
//! 1. `<table>` elements passing [`looks_like_workout_table`], capped at [`MAX_TABLES`],
//!    each prefixed by labels found in preceding siblings (climbing at most
//!    [`MAX_ANCESTOR_LEVELS`] ancestors when the table has no labelled siblings).
//! 2. Workout-looking containers: nested tables, or exercise-like lines as bullets.
//! 3. `<ol>`/`<ul>` lists mentioning sets, reps, or exercises.
//!
//! Output order is document order. Duplicate sections are kept.

use std::collections::HashSet;

use ego_tree::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::dom::{
    body_text, element_text, is_heading, parent_element, prev_element_siblings, raw_text,
    select_all, select_within, tag_name,
};
use crate::extractors::custom::SelectorSpec;
use crate::extractors::patterns::{
    has_exercise_name, has_sets_by_reps, is_heading_label, looks_like_exercise_item,
    looks_like_exercise_line, looks_like_header_row, looks_like_section_label,
    looks_like_workout_container, looks_like_workout_table, mentions_workout_terms,
};
use crate::extractors::select::query_first_match;
use crate::extractors::text_scan::scan_exercise_mentions;
use crate::result::{ExtractedField, FieldKey};

pub const MAX_TABLES: usize = 10;
pub const MAX_LISTS: usize = 5;
pub const MAX_SIBLING_HOPS: usize = 10;
pub const MAX_ANCESTOR_LEVELS: usize = 3;
pub const MAX_LABELS: usize = 3;
pub const MAX_DIV_LINES: usize = 15;
/// Sibling text longer than this ends the heading search.
pub const SECTION_BOUNDARY_LEN: usize = 500;
/// Separator placed between sections in the `exercises` field.
pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

const LABEL_JOINER: &str = " - ";
const CELL_JOINER: &str = " | ";
const BULLET: &str = "• ";

/// Hosts that always count as fitness content.
const FITNESS_HOSTS: &[&str] = &["muscleandstrength.com", "bodybuilding.com"];

const CONTAINER_SELECTORS: &str = ".workout-day, .workout-table, .exercise-table, .routine-table, \
    .workout, .exercises, .routine, .program, .exercise-list, \
    [class*=\"workout\"], [class*=\"exercise\"], [class*=\"routine\"], \
    .entry-content, .post-content, article, \
    .workout-content, .exercise-content, .routine-content";

const DIFFICULTY_LEVELS: &[(&str, &str)] = &[
    ("beginner", "Beginner"),
    ("intermediate", "Intermediate"),
    ("advanced", "Advanced"),
    ("expert", "Expert"),
    ("all levels", "All Levels"),
];

static DURATION_IN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*week").expect("valid regex"));

static DURATION_IN_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)-?week").expect("valid regex"));

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\n\r]+").expect("valid regex"));

/// Returns every detected workout section as readable text, in document order.
pub fn extract_workout_sections(doc: &Html) -> Vec<String> {
    let sections = table_sections(doc);
    if !sections.is_empty() {
        return sections;
    }
    let sections = container_sections(doc);
    if !sections.is_empty() {
        return sections;
    }
    list_sections(doc)
}

fn table_sections(doc: &Html) -> Vec<String> {
    select_all(doc, "table")
        .into_iter()
        .filter(|table| {
            let rows = select_within(table, "tr").len();
            looks_like_workout_table(&element_text(table), rows)
        })
        .filter_map(|table| table_section(&table))
        .take(MAX_TABLES)
        .collect()
}

fn table_section(table: &ElementRef) -> Option<String> {
    let body = parse_workout_table(table)?;
    Some(match section_heading(table) {
        Some(heading) => format!("{heading}\n\n{body}"),
        None => body,
    })
}

fn container_sections(doc: &Html) -> Vec<String> {
    let mut sections = Vec::new();
    let mut producers: HashSet<NodeId> = HashSet::new();

    for container in select_all(doc, CONTAINER_SELECTORS) {
        if container.ancestors().any(|a| producers.contains(&a.id())) {
            continue;
        }
        let tables = select_within(&container, "table");
        if tables.is_empty() && !looks_like_workout_container(&element_text(&container)) {
            continue;
        }

        let before = sections.len();
        if tables.is_empty() {
            sections.extend(parse_workout_div(&container));
        } else {
            sections.extend(tables.iter().filter_map(table_section));
        }
        if sections.len() > before {
            producers.insert(container.id());
        }
    }
    sections
}

fn list_sections(doc: &Html) -> Vec<String> {
    select_all(doc, "ol, ul")
        .into_iter()
        .filter(|list| mentions_workout_terms(&element_text(list)))
        .filter_map(|list| parse_exercise_list(&list))
        .take(MAX_LISTS)
        .collect()
}

/// Finds section labels before `table`, joined with " - ".
///
/// Scans previous siblings nearest first; when none qualify, repeats from the
/// parent, up to [`MAX_ANCESTOR_LEVELS`] levels below `<body>`.
pub fn section_heading(table: &ElementRef) -> Option<String> {
    let mut anchor = *table;
    for _ in 0..=MAX_ANCESTOR_LEVELS {
        let labels = sibling_labels(&anchor);
        if !labels.is_empty() {
            return Some(labels.join(LABEL_JOINER));
        }
        match parent_element(&anchor) {
            Some(parent) if !matches!(parent.value().name(), "body" | "html") => anchor = parent,
            _ => break,
        }
    }
    None
}

fn sibling_labels(anchor: &ElementRef) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for sibling in prev_element_siblings(anchor).take(MAX_SIBLING_HOPS) {
        let tag = tag_name(&sibling);
        if tag == "table" || !select_within(&sibling, "table").is_empty() {
            break;
        }
        let text = element_text(&sibling);
        let is_label = if is_heading(&sibling) {
            is_heading_label(&text)
        } else {
            matches!(tag.as_str(), "p" | "div" | "strong" | "b") && looks_like_section_label(&text)
        };
        if is_label {
            if !labels.contains(&text) {
                labels.push(text);
            }
            if labels.len() >= MAX_LABELS {
                break;
            }
        } else if text.chars().count() > SECTION_BOUNDARY_LEN {
            break;
        }
    }
    labels.reverse();
    labels
}

/// Renders a table as `Header: value | Header: value` rows joined by newlines.
///
/// The first row is a header row when it names exercise columns or uses `<th>`;
/// otherwise columns are labelled `Column N`. Empty and `-` cells are dropped.
pub fn parse_workout_table(table: &ElementRef) -> Option<String> {
    let rows = select_within(table, "tr");
    let first = rows.first()?;
    let first_cells = select_within(first, "th, td");

    let has_header = looks_like_header_row(&element_text(first))
        || !select_within(first, "th").is_empty();
    let (headers, data_rows): (Vec<String>, &[ElementRef]) = if has_header {
        (first_cells.iter().map(element_text).collect(), &rows[1..])
    } else {
        (
            (1..=first_cells.len()).map(|i| format!("Column {i}")).collect(),
            &rows[..],
        )
    };

    let mut lines = Vec::new();
    for row in data_rows {
        if element_text(row).chars().count() < 3 {
            continue;
        }
        let cells = select_within(row, "td, th");
        let parts: Vec<String> = cells
            .iter()
            .zip(headers.iter())
            .filter_map(|(cell, header)| {
                let value = element_text(cell);
                if value.is_empty() || value == "-" {
                    None
                } else if header.is_empty() {
                    Some(value)
                } else {
                    Some(format!("{header}: {value}"))
                }
            })
            .collect();
        if !parts.is_empty() {
            lines.push(parts.join(CELL_JOINER));
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Collects exercise-like lines inside a container as bullets.
///
/// Short descendant elements are tried first; when none qualify, the raw text
/// is split into lines and scanned.
pub fn parse_workout_div(container: &ElementRef) -> Option<String> {
    let mut lines: Vec<String> = select_within(container, "p, li, div, span, strong, b")
        .iter()
        .map(element_text)
        .filter(|text| (10..=200).contains(&text.chars().count()))
        .filter(|text| looks_like_exercise_line(text))
        .take(MAX_DIV_LINES)
        .map(|text| format!("{BULLET}{text}"))
        .collect();

    if lines.is_empty() {
        let raw = raw_text(container);
        let raw = raw.trim();
        if raw.chars().count() > 50 {
            lines = LINE_BREAKS
                .split(raw)
                .map(str::trim)
                .filter(|line| line.chars().count() > 10)
                .take(MAX_DIV_LINES)
                .filter(|line| is_raw_exercise_line(line))
                .map(|line| format!("{BULLET}{line}"))
                .collect();
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn is_raw_exercise_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    let has_digit = line.bytes().any(|b| b.is_ascii_digit());
    (has_digit && (lower.contains("set") || lower.contains("rep")))
        || has_sets_by_reps(line)
        || has_exercise_name(line)
}

/// Lists items that read like exercises as bullets.
pub fn parse_exercise_list(list: &ElementRef) -> Option<String> {
    let items: Vec<String> = select_within(list, "li")
        .iter()
        .map(element_text)
        .filter(|text| looks_like_exercise_item(text))
        .map(|text| format!("{BULLET}{text}"))
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items.join("\n"))
    }
}

/// Known fitness host, or `fitness`/`workout` anywhere in the URL.
pub fn is_fitness_page(url: &str) -> bool {
    let lower = url.to_lowercase();
    FITNESS_HOSTS.iter().any(|h| lower.contains(h))
        || lower.contains("fitness")
        || lower.contains("workout")
}

/// `N weeks` from a `12-week` or `12week` token in the URL.
pub fn week_duration_in_url(url: &str) -> Option<String> {
    DURATION_IN_URL
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|n| format!("{} weeks", n.as_str()))
}

fn week_duration_in_text(text: &str) -> Option<String> {
    DURATION_IN_TEXT
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|n| format!("{} weeks", n.as_str()))
}

fn difficulty_in_text(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    DIFFICULTY_LEVELS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, label)| *label)
}

fn category_from_url(url: &str) -> Option<&'static str> {
    let lower = url.to_lowercase();
    if lower.contains("transformation") {
        Some("Body Transformation")
    } else if lower.contains("muscle") {
        Some("Muscle Building")
    } else if lower.contains("strength") {
        Some("Strength Training")
    } else {
        None
    }
}

/// Output of the fitness extractor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkoutData {
    pub fields: Vec<ExtractedField>,
    /// Raw-text exercise mentions, filled only when no structural section exists.
    pub exercise_mentions: Vec<String>,
}

/// Extracts fitness fields from a fitness page. Returns nothing for other pages.
pub fn extract_workout_data(doc: &Html, url: &str) -> WorkoutData {
    let mut data = WorkoutData::default();
    if !is_fitness_page(url) {
        return data;
    }
    let fields = &mut data.fields;

    let meta_description = [
        SelectorSpec::attr("meta[name=\"description\"]", "content"),
        SelectorSpec::attr("meta[property=\"og:description\"]", "content"),
    ];
    if let Some(m) = query_first_match(doc, &meta_description) {
        fields.push(ExtractedField::new(
            FieldKey::Description,
            m.value,
            format!("fitness:{}", m.selector),
        ));
    }

    let text = body_text(doc);
    if let Some(duration) = week_duration_in_text(&text) {
        fields.push(ExtractedField::new(FieldKey::Duration, duration, "fitness:text"));
    } else if let Some(duration) = week_duration_in_url(url) {
        fields.push(ExtractedField::new(FieldKey::Duration, duration, "fitness:url"));
    }

    if let Some(level) = difficulty_in_text(&text) {
        fields.push(ExtractedField::new(FieldKey::Difficulty, level, "fitness:text"));
    }

    let sections = extract_workout_sections(doc);
    if sections.is_empty() {
        data.exercise_mentions = scan_exercise_mentions(doc);
    } else {
        tracing::debug!(count = sections.len(), "workout sections found");
        data.fields.push(ExtractedField::new(
            FieldKey::Exercises,
            sections.join(SECTION_SEPARATOR),
            "fitness:sections",
        ));
    }

    if let Some(category) = category_from_url(url) {
        data.fields
            .push(ExtractedField::new(FieldKey::Category, category, "fitness:url"));
    }
    data
}
