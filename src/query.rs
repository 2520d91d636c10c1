//! Object listing when no construction document is available.
//!
//! A host that cannot export the construction may still answer name and
//! type queries. The listing is a valid picture whose body is one comment
//! per object, so downstream LaTeX tooling keeps working.

use crate::errors::TranslateError;
use crate::options::Options;
use crate::render::{picture, wrap};

/// Read-only access to a live construction
pub trait GeometryQuery {
    /// All object names, in construction order
    fn object_names(&self) -> Vec<String>;

    /// Type name of an object, e.g. `point` or `conic`
    fn object_type(&self, name: &str) -> Option<String>;
}

/// A wrapped picture listing every object as a `%` comment
pub fn list_objects(query: &dyn GeometryQuery, options: &Options) -> String {
    let body = query
        .object_names()
        .into_iter()
        .map(|name| {
            let ty = query.object_type(&name).unwrap_or_else(|| "unknown".to_string());
            format!("  % {ty} {}", name.replace(['\n', '\r'], " "))
        })
        .collect();
    wrap(&picture(body, options), options)
}

/// Translate `xml` when present, else list what `query` knows about.
///
/// With neither, the result is an empty picture.
pub fn translate_or_list(
    xml: Option<&str>,
    query: Option<&dyn GeometryQuery>,
    options: &Options,
) -> Result<String, TranslateError> {
    match (xml, query) {
        (Some(xml), _) => crate::translate(xml, options),
        (None, Some(query)) => {
            options.validate()?;
            Ok(list_objects(query, options))
        }
        (None, None) => {
            options.validate()?;
            Ok(wrap(&picture(vec!["  % empty construction".to_string()], options), options))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Wrap;

    struct Fixed(Vec<(&'static str, &'static str)>);

    impl GeometryQuery for Fixed {
        fn object_names(&self) -> Vec<String> {
            self.0.iter().map(|(n, _)| n.to_string()).collect()
        }

        fn object_type(&self, name: &str) -> Option<String> {
            self.0.iter().find(|(n, _)| *n == name).map(|(_, t)| t.to_string())
        }
    }

    #[test]
    fn lists_objects_as_comments() {
        let query = Fixed(vec![("A", "point"), ("c", "conic")]);
        let options = Options { wrap: Wrap::Bare, ..Default::default() };
        let out = list_objects(&query, &options);
        assert_eq!(out, "\\begin{tikzpicture}\n  % point A\n  % conic c\n\\end{tikzpicture}\n");
    }

    #[test]
    fn document_wins_over_query() {
        let query = Fixed(vec![("A", "point")]);
        let options = Options { wrap: Wrap::Bare, show_axis: false, ..Default::default() };
        let xml = r#"<geogebra><construction>
            <element type="point" label="B"><coords x="1" y="2" z="1"/></element>
        </construction></geogebra>"#;
        let out = translate_or_list(Some(xml), Some(&query), &options).unwrap();
        assert!(out.contains("\\coordinate (B) at (1, 2);"));
        assert!(!out.contains("% point A"));

        let listed = translate_or_list(None, Some(&query), &options).unwrap();
        assert!(listed.contains("% point A"));

        let empty = translate_or_list(None, None, &options).unwrap();
        assert!(empty.contains("% empty construction"));
    }
}
