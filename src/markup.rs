//! Reads the range inputs declared in the page markup so the native build
//! uses the same limits as the browser build.

use anyhow::{anyhow, Context, Result};
use roxmltree::{Document, Node, ParsingOptions};

use crate::config::{ControlRange, DoorControls};
use crate::error::Dimension;

/// Parses the `width` and `height` range inputs out of an XHTML document.
///
/// Missing `min`, `max` or `step` attributes fall back to the values in
/// `defaults`; a missing input element is an error.
pub fn parse_controls(markup: &str, defaults: &DoorControls) -> Result<DoorControls> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document = Document::parse_with_options(markup, options).context("invalid page markup")?;
    let mut controls = *defaults;
    for dimension in [Dimension::Width, Dimension::Height] {
        let input = find_input(&document, dimension.input_id())?;
        *controls.get_mut(dimension) = parse_range(&input, defaults.get(dimension))
            .with_context(|| format!("invalid <input id=\"{}\">", dimension.input_id()))?;
    }
    Ok(controls)
}

fn find_input<'a, 'input>(document: &'a Document<'input>, id: &str) -> Result<Node<'a, 'input>> {
    document
        .descendants()
        .find(|node| node.has_tag_name("input") && node.attribute("id") == Some(id))
        .ok_or_else(|| anyhow!("<input id=\"{id}\"> is missing"))
}

fn parse_range(node: &Node<'_, '_>, defaults: &ControlRange) -> Result<ControlRange> {
    if let Some(kind) = node.attribute("type") {
        if kind != "range" && kind != "number" {
            return Err(anyhow!("expected a range input, found type=\"{kind}\""));
        }
    }
    let min = parse_f32(node.attribute("min"), defaults.min)?;
    let max = parse_f32(node.attribute("max"), defaults.max)?;
    let step = parse_f32(node.attribute("step"), defaults.step)?;
    let value = parse_f32(node.attribute("value"), defaults.value)?;
    if min > max {
        return Err(anyhow!("min {min} is larger than max {max}"));
    }
    Ok(ControlRange {
        min,
        max,
        step,
        value: value.clamp(min, max),
    })
}

fn parse_f32(value: Option<&str>, default: f32) -> Result<f32> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float {value:?}: {err}")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
  <body>
    <div class="controls">
      <label>Width <input type="range" id="width" min="0.5" max="3" step="0.25" value="2"/></label>
      <span id="widthValue">2</span>
      <label>Height <input type="range" id="height" min="1" max="5" value="4"/></label>
      <span id="heightValue">4</span>
    </div>
  </body>
</html>
"#;

    #[test]
    fn reads_both_ranges() {
        let controls = parse_controls(PAGE, &DoorControls::default()).unwrap();
        assert_eq!(controls.width.min, 0.5);
        assert_eq!(controls.width.max, 3.0);
        assert_eq!(controls.width.step, 0.25);
        assert_eq!(controls.width.value, 2.0);
        assert_eq!(controls.height.max, 5.0);
        // no step attribute
        assert_eq!(controls.height.step, DoorControls::default().height.step);
    }

    #[test]
    fn missing_input_is_an_error() {
        let page = r#"<html><body><input type="range" id="width"/></body></html>"#;
        let err = parse_controls(page, &DoorControls::default()).unwrap_err();
        assert!(err.to_string().contains("height"));
    }

    #[test]
    fn rejects_garbage_numbers() {
        let page = r#"<html><input id="width" min="abc"/><input id="height"/></html>"#;
        assert!(parse_controls(page, &DoorControls::default()).is_err());
    }

    #[test]
    fn bundled_page_matches_default_controls() {
        let page = include_str!("../index.html");
        let controls = parse_controls(page, &DoorControls::default()).unwrap();
        assert_eq!(controls, DoorControls::default());
    }
}
