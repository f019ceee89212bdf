//! Loader for the KEEL `.dat` format.
//!
//! ```text
//! @relation toy
//! @attribute width real [0.0, 10.0]
//! @attribute legs integer [0, 8]
//! @attribute color {red, green}
//! @attribute class {yes, no}
//! @outputs class
//! @data
//! 1.5, 4, red, yes
//! ```
//!
//! Lines starting with `%` and blank lines are ignored. The class attribute
//! is the one named by `@outputs` (or `@output`), otherwise the last
//! declared attribute. Missing values (`?`) are not supported.

use super::attribute::{Attribute, IntervalPolicy};
use super::types::{Dataset, Instance, Metadata};
use crate::error::{DatasetFormatError, Result};
use std::path::Path;

const COMMENT: char = '%';
const MISSING: &str = "?";

/// Reads and parses a KEEL file.
///
/// # Errors
/// Returns [`Error::Io`](crate::Error::Io) if the file cannot be read and
/// [`Error::Dataset`](crate::Error::Dataset) for format problems.
pub fn load<P: AsRef<Path>>(path: P, policy: IntervalPolicy) -> Result<Dataset> {
    let source = std::fs::read_to_string(path.as_ref())?;
    let dataset = parse_str(&source, policy)?;
    log::info!(
        "loaded {} instances, {} attributes, {} classes from {}",
        dataset.len(),
        dataset.metadata().num_attributes(),
        dataset.number_of_classes(),
        path.as_ref().display()
    );
    Ok(dataset)
}

/// Parses KEEL source text.
pub fn parse_str(source: &str, policy: IntervalPolicy) -> std::result::Result<Dataset, DatasetFormatError> {
    let mut attributes = Vec::new();
    let mut output: Option<(usize, String)> = None;
    let mut lines = source
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with(COMMENT));

    let mut data_line = None;
    for (line_no, line) in lines.by_ref() {
        let (keyword, rest) = split_keyword(line);
        match keyword.to_ascii_lowercase().as_str() {
            "@relation" | "@inputs" | "@input" => {}
            "@attribute" => attributes.push(parse_attribute(line_no, rest)?),
            "@outputs" | "@output" => output = Some((line_no, rest.trim().to_string())),
            "@data" => {
                data_line = Some(line_no);
                break;
            }
            other => {
                return Err(DatasetFormatError::new(
                    line_no,
                    format!("unexpected header line starting with `{other}`"),
                ))
            }
        }
    }

    let Some(data_line) = data_line else {
        return Err(DatasetFormatError::new(0, "missing @data section"));
    };
    if attributes.is_empty() {
        return Err(DatasetFormatError::new(data_line, "no attributes declared before @data"));
    }

    let class_index = match output {
        Some((line_no, name)) => {
            let name = unquote(name.split(',').next().unwrap_or_default().trim());
            attributes
                .iter()
                .position(|a| a.name() == name)
                .ok_or_else(|| DatasetFormatError::new(line_no, format!("unknown output attribute `{name}`")))?
        }
        None => attributes.len() - 1,
    };
    let metadata = Metadata::new(attributes, class_index)
        .map_err(|e| DatasetFormatError::new(data_line, e.message))?;

    let mut instances = Vec::new();
    for (line_no, line) in lines {
        instances.push(parse_row(line_no, line, &metadata, policy)?);
    }

    Dataset::new(metadata, instances).map_err(|e| DatasetFormatError::new(data_line, e.message))
}

/// Splits `@keyword rest`.
fn split_keyword(line: &str) -> (&str, &str) {
    match line.find(char::is_whitespace) {
        Some(pos) => (&line[..pos], &line[pos..]),
        None => (line, ""),
    }
}

fn unquote(s: &str) -> &str {
    s.trim_matches(|c| c == '\'' || c == '"')
}

/// Parses the part of an `@attribute` line after the keyword.
fn parse_attribute(line_no: usize, rest: &str) -> std::result::Result<Attribute, DatasetFormatError> {
    let rest = rest.trim();
    let name_end = rest
        .find(|c: char| c.is_whitespace() || c == '{' || c == '[')
        .ok_or_else(|| DatasetFormatError::new(line_no, "attribute declaration without a type"))?;
    let name = unquote(&rest[..name_end]).to_string();
    let decl = rest[name_end..].trim();

    if let Some(body) = decl.strip_prefix('{') {
        let body = body
            .strip_suffix('}')
            .ok_or_else(|| DatasetFormatError::new(line_no, format!("unterminated domain for `{name}`")))?;
        let categories: Vec<String> = body
            .split(',')
            .map(|c| unquote(c.trim()).to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if categories.is_empty() {
            return Err(DatasetFormatError::new(line_no, format!("empty domain for `{name}`")));
        }
        return Ok(Attribute::Categorical { name, categories });
    }

    let (kind, interval) = match decl.find('[') {
        Some(pos) => (decl[..pos].trim(), &decl[pos..]),
        None => (decl, ""),
    };
    let (lo, hi) = parse_interval(line_no, &name, interval)?;

    match kind.to_ascii_lowercase().as_str() {
        "real" => {
            let lo: f64 = lo
                .parse()
                .map_err(|_| DatasetFormatError::new(line_no, format!("bad lower bound `{lo}`")))?;
            let hi: f64 = hi
                .parse()
                .map_err(|_| DatasetFormatError::new(line_no, format!("bad upper bound `{hi}`")))?;
            check_interval(line_no, &name, lo, hi)?;
            Ok(Attribute::Numerical { name, lo, hi })
        }
        "integer" => {
            let lo: i64 = lo
                .parse()
                .map_err(|_| DatasetFormatError::new(line_no, format!("bad lower bound `{lo}`")))?;
            let hi: i64 = hi
                .parse()
                .map_err(|_| DatasetFormatError::new(line_no, format!("bad upper bound `{hi}`")))?;
            check_interval(line_no, &name, lo as f64, hi as f64)?;
            Ok(Attribute::Integer { name, lo, hi })
        }
        other => Err(DatasetFormatError::new(
            line_no,
            format!("unsupported attribute type `{other}` for `{name}`"),
        )),
    }
}

fn parse_interval<'a>(
    line_no: usize,
    name: &str,
    interval: &'a str,
) -> std::result::Result<(&'a str, &'a str), DatasetFormatError> {
    interval
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .and_then(|s| s.split_once(','))
        .map(|(lo, hi)| (lo.trim(), hi.trim()))
        .ok_or_else(|| DatasetFormatError::new(line_no, format!("missing or malformed interval for `{name}`")))
}

fn check_interval(line_no: usize, name: &str, lo: f64, hi: f64) -> std::result::Result<(), DatasetFormatError> {
    if lo > hi {
        return Err(DatasetFormatError::new(
            line_no,
            format!("empty interval [{lo}, {hi}] for `{name}`"),
        ));
    }
    Ok(())
}

fn parse_row(
    line_no: usize,
    line: &str,
    metadata: &Metadata,
    policy: IntervalPolicy,
) -> std::result::Result<Instance, DatasetFormatError> {
    let tokens: Vec<&str> = line.split(',').map(|t| unquote(t.trim())).collect();
    if tokens.len() != metadata.num_attributes() {
        return Err(DatasetFormatError::new(
            line_no,
            format!("expected {} values, found {}", metadata.num_attributes(), tokens.len()),
        ));
    }
    let values = tokens
        .iter()
        .zip(metadata.attributes())
        .map(|(token, attribute)| {
            if *token == MISSING {
                return Err(DatasetFormatError::new(
                    line_no,
                    format!("missing value for `{}` is not supported", attribute.name()),
                ));
            }
            attribute
                .parse(token, policy)
                .map_err(|message| DatasetFormatError::new(line_no, message))
        })
        .collect::<std::result::Result<Vec<f64>, _>>()?;
    Ok(Instance::new(values))
}
