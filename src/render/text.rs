//! Label text for math mode and plain text captions

const GREEK: [(char, &str); 34] = [
    ('α', "\\alpha"),
    ('β', "\\beta"),
    ('γ', "\\gamma"),
    ('δ', "\\delta"),
    ('ε', "\\varepsilon"),
    ('ζ', "\\zeta"),
    ('η', "\\eta"),
    ('θ', "\\theta"),
    ('ι', "\\iota"),
    ('κ', "\\kappa"),
    ('λ', "\\lambda"),
    ('μ', "\\mu"),
    ('ν', "\\nu"),
    ('ξ', "\\xi"),
    ('π', "\\pi"),
    ('ρ', "\\rho"),
    ('σ', "\\sigma"),
    ('τ', "\\tau"),
    ('υ', "\\upsilon"),
    ('φ', "\\varphi"),
    ('χ', "\\chi"),
    ('ψ', "\\psi"),
    ('ω', "\\omega"),
    ('Γ', "\\Gamma"),
    ('Δ', "\\Delta"),
    ('Θ', "\\Theta"),
    ('Λ', "\\Lambda"),
    ('Ξ', "\\Xi"),
    ('Π', "\\Pi"),
    ('Σ', "\\Sigma"),
    ('Υ', "\\Upsilon"),
    ('Φ', "\\Phi"),
    ('Ψ', "\\Psi"),
    ('Ω', "\\Omega"),
];

fn greek(c: char) -> Option<&'static str> {
    GREEK.iter().find(|(g, _)| *g == c).map(|(_, name)| *name)
}

/// Math-mode body for an object label: Greek letters become commands and
/// subscripts get braces, so `α_1` is `\alpha_{1}` and `A_{12}` stays.
pub fn math_label(label: &str) -> String {
    let (base, sub) = match label.split_once('_') {
        Some((base, sub)) => (base, Some(sub)),
        None => (label, None),
    };
    let mut out = transliterate(base);
    if let Some(sub) = sub {
        let inner = sub.strip_prefix('{').and_then(|s| s.strip_suffix('}')).unwrap_or(sub);
        out.push_str("_{");
        out.push_str(&transliterate(inner));
        out.push('}');
    }
    out
}

fn transliterate(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match greek(c) {
            Some(name) => {
                out.push_str(name);
                // a following letter would glue onto the command name
                if chars.peek().is_some_and(|n| n.is_ascii_alphabetic()) {
                    out.push(' ');
                }
            }
            None => out.push(c),
        }
    }
    out
}

/// Escape LaTeX specials in free text such as captions
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' | '}' | '$' | '&' | '%' | '#' | '_' => {
                out.push('\\');
                out.push(c);
            }
            '^' => out.push_str("\\^{}"),
            '~' => out.push_str("\\~{}"),
            _ => out.push(c),
        }
    }
    out
}

/// TikZ-safe coordinate name for a label
pub fn coordinate_name(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            c if c.is_ascii_alphanumeric() => out.push(c),
            '\'' => out.push('p'),
            '_' | '{' | '}' => {}
            c => match greek(c) {
                Some(name) => out.push_str(&name[1..]),
                None => out.push('-'),
            },
        }
    }
    if out.is_empty() { "pt".to_string() } else { out }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(math_label("A"), "A");
        assert_eq!(math_label("A_1"), "A_{1}");
        assert_eq!(math_label("A_{12}"), "A_{12}");
        assert_eq!(math_label("α"), "\\alpha");
        assert_eq!(math_label("β_1"), "\\beta_{1}");
        assert_eq!(math_label("A'"), "A'");
    }

    #[test]
    fn captions() {
        assert_eq!(escape_text("50% of a_b"), "50\\% of a\\_b");
        assert_eq!(escape_text("{x}"), "\\{x\\}");
    }

    #[test]
    fn coordinate_names() {
        assert_eq!(coordinate_name("A_{1}"), "A1");
        assert_eq!(coordinate_name("B'"), "Bp");
        assert_eq!(coordinate_name("α"), "alpha");
    }
}
