use geotikz::bounds::compute_bounds;
use geotikz::options::{Viewport, Wrap};
use geotikz::{Options, build_model, read_document, translate};
use regex_lite::Regex;

fn construction(body: &str) -> String {
    format!("<geogebra format=\"5.0\"><construction>{body}</construction></geogebra>")
}

fn point(label: &str, x: f64, y: f64) -> String {
    format!(r#"<element type="point" label="{label}"><coords x="{x}" y="{y}" z="1"/></element>"#)
}

fn bare() -> Options {
    Options { wrap: Wrap::Bare, show_axis: false, ..Default::default() }
}

#[test]
fn circle_from_center_and_radius() {
    let xml = construction(
        r#"<command name="Circle"><input a0="(0, 0)" a1="2"/><output a0="c"/></command>
        <element type="conic" label="c">
          <matrix A0="1" A1="1" A2="-4" A3="0" A4="0" A5="0"/>
        </element>"#,
    );
    let tikz = translate(&xml, &bare()).unwrap();
    assert!(tikz.contains("(0, 0) circle (2); % c: circle_by_center_radius"), "{tikz}");
    assert!(tikz.contains("% conics"));
}

#[test]
fn segment_between_named_points() {
    let xml = construction(&format!(
        r#"{}{}
        <command name="Segment"><input a0="A" a1="B"/><output a0="s"/></command>
        <element type="segment" label="s"><show object="true" label="false"/></element>"#,
        point("A", 0.0, 0.0),
        point("B", 3.0, 4.0),
    ));
    let tikz = translate(&xml, &bare()).unwrap();
    assert!(tikz.contains("\\coordinate (A) at (0, 0);"));
    assert!(tikz.contains("\\coordinate (B) at (3, 4);"));
    assert!(tikz.contains("(A) -- (B);"), "{tikz}");
}

#[test]
fn right_angle_is_a_square_either_way_round() {
    let draw = r"\\draw(\[[^\]]*\])? ";
    let square = format!(r"{draw}\(0\.5, 0\) -- \(0\.5, 0\.5\) -- \(0, 0\.5\);");
    let reversed = format!(r"{draw}\(0, 0\.5\) -- \(0\.5, 0\.5\) -- \(0\.5, 0\);");
    let (square, reversed) = (Regex::new(&square).unwrap(), Regex::new(&reversed).unwrap());
    for (a, c) in [("A", "C"), ("C", "A")] {
        let xml = construction(&format!(
            r#"{}{}{}
            <command name="Angle"><input a0="{a}" a1="B" a2="{c}"/><output a0="α"/></command>
            <element type="angle" label="α"><show object="true" label="false"/></element>"#,
            point("A", 2.0, 0.0),
            point("B", 0.0, 0.0),
            point("C", 0.0, 2.0),
        ));
        let tikz = translate(&xml, &bare()).unwrap();
        assert!(square.is_match(&tikz) || reversed.is_match(&tikz), "{tikz}");
        assert!(!tikz.contains("arc["), "{tikz}");
    }
}

#[test]
fn reciprocal_splits_at_the_pole() {
    let xml = construction(
        r#"<expression label="f" exp="f(x) = 1 / x" type="function"/>
        <element type="function" label="f"/>"#,
    );
    let tikz = translate(&xml, &bare()).unwrap();
    let domain = Regex::new(r"domain=(-?[0-9.]+):(-?[0-9.]+)").unwrap();
    let runs: Vec<(f64, f64)> = domain
        .captures_iter(&tikz)
        .map(|c| (c[1].parse().unwrap(), c[2].parse().unwrap()))
        .collect();
    assert!(runs.len() >= 2, "{tikz}");
    for (a, b) in runs {
        assert!(a < b);
        assert!(!(a < 0.0 && b > 0.0), "run {a}:{b} crosses the pole");
    }
    assert!(tikz.contains("\\clip (-5, -5) rectangle (5, 5);"));
}

#[test]
fn tangent_reports_touch_point() {
    let xml = construction(&format!(
        r#"{}
        <command name="Circle"><input a0="O" a1="5"/><output a0="c"/></command>
        <element type="conic" label="c">
          <matrix A0="1" A1="1" A2="-25" A3="0" A4="0" A5="0"/>
        </element>
        {}
        <command name="Tangent"><input a0="P" a1="c"/><output a0="t" a1="u"/></command>
        <element type="line" label="t"><coords x="0" y="1" z="-5"/></element>"#,
        point("O", 0.0, 0.0),
        point("P", 3.0, 5.0),
    ));
    let options = Options { viewport: Viewport { smart: true, ..Default::default() }, ..bare() };
    let tikz = translate(&xml, &options).unwrap();
    assert!(tikz.contains("(O) circle (5)"), "{tikz}");
    assert!(tikz.contains("% t: tangent to c at (0, 5)"), "{tikz}");

    let lines = tikz.find("% lines").unwrap();
    let conics = tikz.find("% conics").unwrap();
    assert!(conics < lines);
}

#[test]
fn smart_bounds_are_idempotent() {
    let xml = construction(&format!(
        "{}{}{}",
        point("A", -1.0, 2.0),
        point("B", 6.0, 3.5),
        point("C", 2.0, -4.0)
    ));
    let model = build_model(&read_document(&xml).unwrap());
    let smart = Viewport { smart: true, ..Default::default() };
    let first = compute_bounds(&model, &smart);
    assert!(first.x_min < -1.0 && first.x_max > 6.0);
    assert!(first.y_min < -4.0 && first.y_max > 3.5);
    assert_eq!(compute_bounds(&model, &smart), first);

    let fixed = Viewport {
        smart: false,
        x_min: first.x_min,
        x_max: first.x_max,
        y_min: first.y_min,
        y_max: first.y_max,
        ..Default::default()
    };
    assert_eq!(compute_bounds(&model, &fixed), first);
}

#[test]
fn unsupported_objects_become_comments() {
    let xml = construction(&format!(
        r#"{}<element type="image" label="pic1"><file name="a.png"/></element>"#,
        point("A", 1.0, 1.0)
    ));
    let tikz = translate(&xml, &bare()).unwrap();
    assert!(tikz.contains("% unsupported"));
    assert!(tikz.contains("% image pic1: element type `image` (file)"), "{tikz}");
    assert!(tikz.contains("\\coordinate (A) at (1, 1);"));
}

#[test]
fn origin_is_synthesized_with_axes() {
    let xml = construction(&point("A", 1.0, 1.0));
    let options = Options { wrap: Wrap::Bare, ..Default::default() };
    let tikz = translate(&xml, &options).unwrap();
    assert!(tikz.contains("node[right] {$x$}"));
    assert!(tikz.contains("{$O$}"), "{tikz}");

    let with_origin = construction(&point("O", 0.0, 0.0));
    let tikz = translate(&with_origin, &options).unwrap();
    assert_eq!(tikz.matches("{$O$}").count(), 1, "{tikz}");
}

fn triangle(polygon_shown: bool) -> String {
    construction(&format!(
        r#"{}{}{}
        <command name="Polygon">
          <input a0="A" a1="B" a2="C"/><output a0="t1" a1="c" a2="a" a3="b"/>
        </command>
        <element type="polygon" label="t1"><show object="{polygon_shown}" label="false"/></element>
        <element type="segment" label="c"><show object="true" label="false"/></element>
        <element type="segment" label="a"><show object="true" label="false"/></element>
        <element type="segment" label="b"><show object="true" label="false"/></element>"#,
        point("A", 0.0, 0.0),
        point("B", 3.0, 0.0),
        point("C", 0.0, 4.0),
    ))
}

#[test]
fn hidden_polygon_keeps_its_edges() {
    let tikz = translate(&triangle(false), &bare()).unwrap();
    assert!(!tikz.contains("-- cycle"), "{tikz}");
    assert!(tikz.contains("% segments"), "{tikz}");
    assert!(tikz.contains("(A) -- (B);"), "{tikz}");
    let edges = tikz
        .lines()
        .filter(|l| l.trim_start().starts_with("\\draw") && l.contains(") -- ("))
        .count();
    assert_eq!(edges, 3, "{tikz}");
}

#[test]
fn shown_polygon_draws_edges_once() {
    let tikz = translate(&triangle(true), &bare()).unwrap();
    assert!(tikz.contains("(A) -- (B) -- (C) -- cycle;"), "{tikz}");
    assert!(!tikz.contains("% segments"), "{tikz}");
}

#[test]
fn duplicate_label_is_drawn_once() {
    let xml = construction(&format!("{}{}", point("A", 0.0, 0.0), point("A", 2.0, 2.0)));
    let tikz = translate(&xml, &bare()).unwrap();
    assert!(tikz.contains("% warning: duplicate element label `A`, keeping the first"), "{tikz}");
    assert_eq!(tikz.matches("\\coordinate (A)").count(), 1, "{tikz}");
    assert!(tikz.contains("\\coordinate (A) at (0, 0);"), "{tikz}");
    assert_eq!(tikz.matches("{$A$}").count(), 1, "{tikz}");
}
