use camino::Utf8Path;
use geotikz::Options;
use geotikz::options::{StyleMode, Wrap};
use regex_lite::Regex;

/// Category headers in the order the renderer must emit them
const HEADERS: [&str; 10] = [
    "functions",
    "conics",
    "conic parts",
    "lines",
    "rays",
    "polygons",
    "vectors",
    "segments",
    "angles",
    "points",
];

/// Every `\begin{env}` closed by a matching `\end{env}`, innermost first
fn check_environments(tikz: &str) -> Result<(), String> {
    let re = Regex::new(r"\\(begin|end)\{([a-z]+)\}").unwrap();
    let mut stack: Vec<&str> = Vec::new();
    for caps in re.captures_iter(tikz) {
        let env = caps.get(2).unwrap().as_str();
        if &caps[1] == "begin" {
            stack.push(env);
        } else {
            match stack.pop() {
                Some(open) if open == env => {}
                Some(open) => return Err(format!("\\end{{{env}}} closes \\begin{{{open}}}")),
                None => return Err(format!("\\end{{{env}}} without \\begin")),
            }
        }
    }
    match stack.last() {
        Some(open) => Err(format!("\\begin{{{open}}} never closed")),
        None => Ok(()),
    }
}

fn check_numbers(tikz: &str) -> Result<(), String> {
    let re = Regex::new(r"NaN|\binf\b").unwrap();
    match re.find(tikz) {
        Some(m) => Err(format!("non-finite number `{}` in output", m.as_str())),
        None => Ok(()),
    }
}

fn check_header_order(tikz: &str) -> Result<(), String> {
    let positions: Vec<usize> = tikz
        .lines()
        .filter_map(|line| {
            let comment = line.trim().strip_prefix("% ")?;
            HEADERS.iter().position(|h| *h == comment)
        })
        .collect();
    if positions.windows(2).all(|w| w[0] < w[1]) {
        Ok(())
    } else {
        let names: Vec<_> = positions.iter().map(|&i| HEADERS[i]).collect();
        Err(format!("category headers out of order: {names:?}"))
    }
}

fn check_translation(
    path: &Utf8Path,
    xml: &str,
    options: &Options,
) -> datatest_stable::Result<String> {
    let tikz = geotikz::translate(xml, options)?;
    let again = geotikz::translate(xml, options)?;
    if tikz != again {
        return Err(format!("{path}: translation is not deterministic").into());
    }
    for check in [check_environments, check_numbers, check_header_order] {
        check(&tikz).map_err(|e| format!("{path} ({:?}): {e}\n{tikz}", options.wrap))?;
    }
    Ok(tikz)
}

/// Pins the bare picture so any change to a fixture's output shows up as a diff
fn snapshot(path: &Utf8Path, tikz: &str) {
    let file = path.file_name().unwrap_or("fixture");
    let stem = path.file_stem().unwrap_or("fixture");
    let description = format!("bare output of {file}");
    insta::with_settings!({ description => description, omit_expression => true }, {
        insta::assert_snapshot!(format!("bare_{stem}"), tikz);
    });
}

fn test_fixture(path: &Utf8Path) -> datatest_stable::Result<()> {
    let xml = std::fs::read_to_string(path)?;

    for wrap in [Wrap::Standalone, Wrap::Figure, Wrap::Bare] {
        let options = Options { wrap, caption: Some("Fixture".into()), ..Default::default() };
        let tikz = check_translation(path, &xml, &options)?;
        match wrap {
            Wrap::Standalone => assert!(tikz.starts_with("\\documentclass"), "{path}: {tikz}"),
            Wrap::Figure => assert!(tikz.contains("\\caption{Fixture}"), "{path}: {tikz}"),
            Wrap::Bare => {
                assert!(tikz.starts_with("\\begin{tikzpicture}"), "{path}: {tikz}");
                snapshot(path, &tikz);
            }
        }
    }

    let native = Options {
        style_mode: StyleMode::Native,
        viewport: geotikz::options::Viewport { smart: true, ..Default::default() },
        ..Default::default()
    };
    check_translation(path, &xml, &native)?;
    Ok(())
}

datatest_stable::harness! {
    {
        test = test_fixture,
        root = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"),
        pattern = r"\.xml$",
    },
}
