//! Translate GeoGebra constructions into TikZ.
//!
//! The pipeline is a chain of pure stages:
//!
//! 1. [`read_document`] turns construction XML into a flat [`Document`]
//! 2. [`build_model`] classifies it into a typed geometric [`Model`]
//! 3. [`render::render`] emits TikZ for the model under [`Options`]
//!
//! Only malformed XML and invalid options abort a translation. Everything
//! else degrades into `%` comments in the output.

pub mod bounds;
pub mod document;
pub mod errors;
pub mod expr;
pub mod layout;
pub mod log;
pub mod model;
pub mod options;
pub mod query;
pub mod render;
pub mod solve;
pub mod types;

pub use document::{Document, read_document};
pub use errors::{ExprError, OptionsError, ReadError, TranslateError};
pub use model::{Model, build_model};
pub use options::Options;
pub use query::{GeometryQuery, list_objects, translate_or_list};

/// Translate construction XML to TikZ.
///
/// ```
/// let xml = r#"<geogebra><construction>
///   <element type="point" label="A"><coords x="1" y="2" z="1"/></element>
/// </construction></geogebra>"#;
/// let tikz = geotikz::translate(xml, &geotikz::Options::default()).unwrap();
/// assert!(tikz.contains("\\coordinate (A) at (1, 2);"));
/// ```
pub fn translate(xml: &str, options: &Options) -> Result<String, TranslateError> {
    options.validate()?;
    let document = read_document(xml)?;
    Ok(render_document(&document, options))
}

/// Translate an already parsed document.
pub fn translate_document(document: &Document, options: &Options) -> Result<String, OptionsError> {
    options.validate()?;
    Ok(render_document(document, options))
}

fn render_document(document: &Document, options: &Options) -> String {
    let model = build_model(document);
    render::render(&model, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Wrap;

    const TRIANGLE: &str = r#"<geogebra format="5.0">
<construction>
  <element type="point" label="A">
    <show object="true" label="true"/><coords x="0" y="0" z="1"/>
  </element>
  <element type="point" label="B">
    <show object="true" label="true"/><coords x="3" y="0" z="1"/>
  </element>
  <element type="point" label="C">
    <show object="true" label="true"/><coords x="0" y="4" z="1"/>
  </element>
  <command name="Polygon">
    <input a0="A" a1="B" a2="C"/>
    <output a0="t1" a1="c" a2="a" a3="b"/>
  </command>
  <element type="polygon" label="t1"><show object="true" label="false"/></element>
  <element type="segment" label="c"><show object="true" label="false"/></element>
  <element type="segment" label="a"><show object="true" label="false"/></element>
  <element type="segment" label="b"><show object="true" label="false"/></element>
</construction>
</geogebra>"#;

    #[test]
    fn triangle_translates() {
        let options = Options { wrap: Wrap::Bare, show_axis: false, ..Default::default() };
        let out = translate(TRIANGLE, &options).unwrap();
        assert!(out.contains("\\coordinate (A) at (0, 0);"));
        assert!(out.contains("\\draw[line width=0.8pt] (A) -- (B) -- (C) -- cycle;"), "{out}");
        // polygon edges are not drawn twice
        assert!(!out.contains("% segments"));
        assert_eq!(out.matches("\\fill").count(), 3);
    }

    #[test]
    fn invalid_options_abort() {
        let mut options = Options::default();
        options.viewport.x_min = 10.0;
        assert!(matches!(translate(TRIANGLE, &options), Err(TranslateError::Options(_))));
    }

    #[test]
    fn malformed_xml_aborts() {
        let err =
            translate("<geogebra><construction></geogebra>", &Options::default()).unwrap_err();
        assert!(matches!(err, TranslateError::Read(_)));
    }

    #[test]
    fn translation_is_deterministic() {
        let options = Options::default();
        assert_eq!(translate(TRIANGLE, &options).unwrap(), translate(TRIANGLE, &options).unwrap());
    }
}
