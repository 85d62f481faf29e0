//! Date-span recognition for entry titles and standalone date lines.
//!
//! Accepted points: `Jan 2022`, `January 2022`, `Sept. 2021`, `03/2020`, `2019`.
//! Accepted ends additionally include `Present`, `Current`, `Now`, `Today`.
//! Separators: `-`, `–`, `—`, `to`.

use once_cell::sync::Lazy;
use regex::Regex;

const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";

fn span_pattern() -> String {
    let point = format!(r"(?:{MONTH}\s+\d{{4}}|\d{{1,2}}/\d{{4}}|(?:19|20)\d{{2}})");
    let end = format!(r"(?:{point}|present|current|now|today)");
    format!(r"{point}(?:\s*(?:-|–|—|to)\s*{end})?")
}

/// A whole line that is nothing but a date span, optionally parenthesized.
static DATE_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^\(?\s*({})\s*\)?$", span_pattern())).expect("valid date line regex")
});

/// A parenthesized date span at the end of a line.
static TRAILING_PAREN_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\s*\(\s*({})\s*\)\s*$", span_pattern()))
        .expect("valid trailing date regex")
});

/// A date span after the last `|`, `,` or run of 2+ spaces at the end of a line.
static TRAILING_SEGMENT_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)(?:\s*[|,]\s*|\s{{2,}})({})\s*$", span_pattern()))
        .expect("valid trailing segment regex")
});

/// Returns the normalized span if the whole line is a date span.
pub fn standalone_date(line: &str) -> Option<String> {
    DATE_LINE_RE
        .captures(line.trim())
        .and_then(|c| c.get(1))
        .map(|m| normalize(m.as_str()))
}

/// Splits a trailing date span off a title line: `(title_without_date, date)`.
///
/// Parenthesized spans are preferred; otherwise a span forming the final pipe/comma
/// segment is taken. Returns `None` when no trailing date is present or when removing
/// it would leave an empty title.
pub fn split_trailing_date(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    let caps = TRAILING_PAREN_DATE_RE
        .captures(line)
        .or_else(|| TRAILING_SEGMENT_DATE_RE.captures(line))?;

    let whole = caps.get(0)?;
    let span = caps.get(1)?;
    let title = line[..whole.start()]
        .trim_end_matches(|c: char| c.is_whitespace() || c == '|' || c == ',')
        .to_string();

    if title.is_empty() {
        return None;
    }
    Some((title, normalize(span.as_str())))
}

/// Collapses internal whitespace and puts single spaces around the range separator.
fn normalize(span: &str) -> String {
    let collapsed = span.split_whitespace().collect::<Vec<_>>().join(" ");
    for sep in ['–', '—', '-'] {
        if let Some((start, end)) = collapsed.split_once(sep) {
            // Leave "03/2020"-style points alone; only the range dash is respaced.
            return format!("{} {} {}", start.trim(), sep, end.trim());
        }
    }
    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standalone_month_range() {
        assert_eq!(
            standalone_date("Jan 2022 - Present").as_deref(),
            Some("Jan 2022 - Present")
        );
        assert_eq!(
            standalone_date("(March 2018 – June 2020)").as_deref(),
            Some("March 2018 – June 2020")
        );
    }

    #[test]
    fn test_standalone_year_range_and_single_year() {
        assert_eq!(standalone_date("2016-2019").as_deref(), Some("2016 - 2019"));
        assert_eq!(standalone_date("2019").as_deref(), Some("2019"));
        assert_eq!(standalone_date("05/2021 to Current").as_deref(), Some("05/2021 to Current"));
    }

    #[test]
    fn test_standalone_rejects_prose() {
        assert_eq!(standalone_date("Joined in 2019 as analyst"), None);
        assert_eq!(standalone_date("May the best win"), None);
        assert_eq!(standalone_date("1234"), None);
    }

    #[test]
    fn test_split_parenthesized_trailing_date() {
        let (title, date) =
            split_trailing_date("Senior Analyst | Acme Corp | Remote (Jan 2022 - Present)").unwrap();
        assert_eq!(title, "Senior Analyst | Acme Corp | Remote");
        assert_eq!(date, "Jan 2022 - Present");
    }

    #[test]
    fn test_split_final_pipe_segment_date() {
        let (title, date) = split_trailing_date("BSc Economics | State University | 2019").unwrap();
        assert_eq!(title, "BSc Economics | State University");
        assert_eq!(date, "2019");
    }

    #[test]
    fn test_split_comma_segment_date() {
        let (title, date) = split_trailing_date("Data Intern, Globex, Jun 2018 - Aug 2018").unwrap();
        assert_eq!(title, "Data Intern, Globex");
        assert_eq!(date, "Jun 2018 - Aug 2018");
    }

    #[test]
    fn test_split_none_without_date() {
        assert_eq!(split_trailing_date("Senior Analyst | Acme Corp"), None);
        assert_eq!(split_trailing_date("Reduced cost by 2019 units"), None);
    }

    #[test]
    fn test_split_refuses_empty_title() {
        assert_eq!(split_trailing_date("(2019 - 2021)"), None);
    }
}
