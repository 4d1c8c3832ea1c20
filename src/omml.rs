//! Office Math (OMML) to LaTeX conversion.
//!
//! Slide text bodies can embed `m:oMath` islands. The package reader captures
//! each island as a raw XML fragment; this module renders the fragment to a
//! LaTeX string so formulas survive the trip to Markdown as `$$...$$` blocks.
//!
//! Conversion is best-effort over the constructs that actually show up on
//! slides: runs, fractions, sub/superscripts, radicals, delimiters, n-ary
//! operators, bars, functions and limits. Anything unrecognised renders its
//! children inline, and a fragment that fails to parse yields [`None`] so the
//! caller can drop the formula instead of emitting garbage.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Convert one captured `m:oMath` fragment to LaTeX.
///
/// Returns `None` when the fragment is malformed or renders to nothing.
pub(crate) fn omml_to_latex(fragment: &str) -> Option<String> {
    let mut reader = Reader::from_str(fragment);
    let latex = render_children(&mut reader, b"")?;
    let latex = latex.trim().to_string();
    if latex.is_empty() {
        None
    } else {
        Some(latex)
    }
}

/// Render child content until the `stop` end tag (or EOF when `stop` is
/// empty, i.e. at the top level).
fn render_children(reader: &mut Reader<&[u8]>, stop: &[u8]) -> Option<String> {
    let mut out = String::new();
    loop {
        match reader.read_event().ok()? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                match name.as_slice() {
                    b"t" => out.push_str(&render_text(reader)?),
                    b"f" => out.push_str(&render_fraction(reader)?),
                    b"sSup" => out.push_str(&render_script(reader, b"sSup")?),
                    b"sSub" => out.push_str(&render_script(reader, b"sSub")?),
                    b"sSubSup" => out.push_str(&render_script(reader, b"sSubSup")?),
                    b"rad" => out.push_str(&render_radical(reader)?),
                    b"d" => out.push_str(&render_delimiter(reader)?),
                    b"nary" => out.push_str(&render_nary(reader)?),
                    b"bar" => out.push_str(&render_bar(reader)?),
                    b"func" => out.push_str(&render_func(reader)?),
                    b"limLow" => out.push_str(&render_limit(reader, b"limLow")?),
                    b"limUpp" => out.push_str(&render_limit(reader, b"limUpp")?),
                    // Property containers carry formatting only
                    _ if name.ends_with(b"Pr") => skip_subtree(reader)?,
                    // Transparent wrappers: oMath, oMathPara, r, e, ...
                    _ => out.push_str(&render_children(reader, &name)?),
                }
            }
            Event::End(e) if e.local_name().as_ref() == stop => return Some(out),
            Event::End(_) => return None,
            Event::Eof => {
                return if stop.is_empty() { Some(out) } else { None };
            }
            _ => {}
        }
    }
}

/// Text content of an `m:t` element, escaped for LaTeX with common Unicode
/// math symbols mapped to their commands.
fn render_text(reader: &mut Reader<&[u8]>) -> Option<String> {
    let mut raw = String::new();
    loop {
        match reader.read_event().ok()? {
            Event::Text(t) => raw.push_str(&t.unescape().ok()?),
            Event::End(e) if e.local_name().as_ref() == b"t" => break,
            Event::Eof => return None,
            _ => {}
        }
    }
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '#' | '$' | '%' | '&' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            _ => match symbol_command(c) {
                Some(cmd) => {
                    out.push_str(cmd);
                    out.push(' ');
                }
                None => out.push(c),
            },
        }
    }
    Some(out)
}

fn render_fraction(reader: &mut Reader<&[u8]>) -> Option<String> {
    let mut num = String::new();
    let mut den = String::new();
    loop {
        match reader.read_event().ok()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"num" => num = render_children(reader, b"num")?,
                b"den" => den = render_children(reader, b"den")?,
                _ => skip_subtree(reader)?,
            },
            Event::End(e) if e.local_name().as_ref() == b"f" => {
                return Some(format!("\\frac{{{}}}{{{}}}", num, den));
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

fn render_script(reader: &mut Reader<&[u8]>, end: &[u8]) -> Option<String> {
    let mut base = String::new();
    let mut sub = String::new();
    let mut sup = String::new();
    loop {
        match reader.read_event().ok()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"e" => base = render_children(reader, b"e")?,
                b"sub" => sub = render_children(reader, b"sub")?,
                b"sup" => sup = render_children(reader, b"sup")?,
                _ => skip_subtree(reader)?,
            },
            Event::End(e) if e.local_name().as_ref() == end => {
                let mut out = group(&base);
                if end != b"sSup" {
                    out.push_str(&format!("_{{{}}}", sub));
                }
                if end != b"sSub" {
                    out.push_str(&format!("^{{{}}}", sup));
                }
                return Some(out);
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

fn render_radical(reader: &mut Reader<&[u8]>) -> Option<String> {
    let mut deg_hidden = false;
    let mut degree = String::new();
    let mut base = String::new();
    loop {
        match reader.read_event().ok()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"radPr" => {
                    scan_properties(reader, b"radPr", |name, val| {
                        if name == b"degHide" && is_on(val.as_deref()) {
                            deg_hidden = true;
                        }
                    })?;
                }
                b"deg" => degree = render_children(reader, b"deg")?,
                b"e" => base = render_children(reader, b"e")?,
                _ => skip_subtree(reader)?,
            },
            Event::End(e) if e.local_name().as_ref() == b"rad" => {
                return Some(if deg_hidden || degree.trim().is_empty() {
                    format!("\\sqrt{{{}}}", base)
                } else {
                    format!("\\sqrt[{}]{{{}}}", degree, base)
                });
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

fn render_delimiter(reader: &mut Reader<&[u8]>) -> Option<String> {
    let mut beg: Option<String> = None;
    let mut end: Option<String> = None;
    let mut sep: Option<String> = None;
    let mut items: Vec<String> = Vec::new();
    loop {
        match reader.read_event().ok()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"dPr" => {
                    scan_properties(reader, b"dPr", |name, val| match name {
                        b"begChr" => beg = Some(val.unwrap_or_default()),
                        b"endChr" => end = Some(val.unwrap_or_default()),
                        b"sepChr" => sep = Some(val.unwrap_or_default()),
                        _ => {}
                    })?;
                }
                b"e" => items.push(render_children(reader, b"e")?),
                _ => skip_subtree(reader)?,
            },
            Event::End(e) if e.local_name().as_ref() == b"d" => {
                let open = delimiter_latex(beg.as_deref(), "(");
                let close = delimiter_latex(end.as_deref(), ")");
                let joined = items.join(sep.as_deref().unwrap_or("|"));
                return Some(format!("\\left{}{}\\right{}", open, joined, close));
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

fn render_nary(reader: &mut Reader<&[u8]>) -> Option<String> {
    let mut chr: Option<String> = None;
    let mut hide_sub = false;
    let mut hide_sup = false;
    let mut sub = String::new();
    let mut sup = String::new();
    let mut body = String::new();
    loop {
        match reader.read_event().ok()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"naryPr" => {
                    scan_properties(reader, b"naryPr", |name, val| match name {
                        b"chr" => chr = val,
                        b"subHide" if is_on(val.as_deref()) => hide_sub = true,
                        b"supHide" if is_on(val.as_deref()) => hide_sup = true,
                        _ => {}
                    })?;
                }
                b"sub" => sub = render_children(reader, b"sub")?,
                b"sup" => sup = render_children(reader, b"sup")?,
                b"e" => body = render_children(reader, b"e")?,
                _ => skip_subtree(reader)?,
            },
            Event::End(e) if e.local_name().as_ref() == b"nary" => {
                // Operator defaults to the integral sign when chr is absent
                let op = match chr.as_deref().and_then(|c| c.chars().next()) {
                    Some(c) => nary_operator(c),
                    None => "\\int".to_string(),
                };
                let mut out = op;
                if !hide_sub && !sub.trim().is_empty() {
                    out.push_str(&format!("_{{{}}}", sub));
                }
                if !hide_sup && !sup.trim().is_empty() {
                    out.push_str(&format!("^{{{}}}", sup));
                }
                if !body.trim().is_empty() {
                    out.push(' ');
                    out.push_str(&body);
                }
                return Some(out);
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

fn render_bar(reader: &mut Reader<&[u8]>) -> Option<String> {
    let mut top = false;
    let mut base = String::new();
    loop {
        match reader.read_event().ok()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"barPr" => {
                    scan_properties(reader, b"barPr", |name, val| {
                        if name == b"pos" && val.as_deref() == Some("top") {
                            top = true;
                        }
                    })?;
                }
                b"e" => base = render_children(reader, b"e")?,
                _ => skip_subtree(reader)?,
            },
            Event::End(e) if e.local_name().as_ref() == b"bar" => {
                return Some(if top {
                    format!("\\overline{{{}}}", base)
                } else {
                    format!("\\underline{{{}}}", base)
                });
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

fn render_func(reader: &mut Reader<&[u8]>) -> Option<String> {
    let mut name = String::new();
    let mut arg = String::new();
    loop {
        match reader.read_event().ok()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"fName" => name = render_children(reader, b"fName")?,
                b"e" => arg = render_children(reader, b"e")?,
                _ => skip_subtree(reader)?,
            },
            Event::End(e) if e.local_name().as_ref() == b"func" => {
                let head = function_command(name.trim());
                return Some(format!("{}{{{}}}", head, arg));
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

/// `m:limLow` / `m:limUpp`: a base with a limit under or over it.
fn render_limit(reader: &mut Reader<&[u8]>, end: &[u8]) -> Option<String> {
    let mut base = String::new();
    let mut limit = String::new();
    loop {
        match reader.read_event().ok()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"e" => base = render_children(reader, b"e")?,
                b"lim" => limit = render_children(reader, b"lim")?,
                _ => skip_subtree(reader)?,
            },
            Event::End(e) if e.local_name().as_ref() == end => {
                let head = if base.trim() == "lim" {
                    "\\lim".to_string()
                } else {
                    group(&base)
                };
                let mark = if end == b"limLow" { '_' } else { '^' };
                return Some(format!("{}{}{{{}}}", head, mark, limit));
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

/// Walk a property container, reporting each empty property element's local
/// name and `m:val` to the callback. Nested containers (e.g. `m:ctrlPr`
/// holding run properties) are skipped whole.
fn scan_properties(
    reader: &mut Reader<&[u8]>,
    end: &[u8],
    mut visit: impl FnMut(&[u8], Option<String>),
) -> Option<()> {
    loop {
        match reader.read_event().ok()? {
            Event::Empty(e) => {
                let name = e.local_name().as_ref().to_vec();
                visit(&name, attr_val(&e));
            }
            Event::Start(_) => skip_subtree(reader)?,
            Event::End(e) if e.local_name().as_ref() == end => return Some(()),
            Event::Eof => return None,
            _ => {}
        }
    }
}

/// Consume events through the end tag matching the Start already read.
fn skip_subtree(reader: &mut Reader<&[u8]>) -> Option<()> {
    let mut depth = 0usize;
    loop {
        match reader.read_event().ok()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                if depth == 0 {
                    return Some(());
                }
                depth -= 1;
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

fn attr_val(e: &quick_xml::events::BytesStart<'_>) -> Option<String> {
    for attr in e.attributes() {
        let attr = attr.ok()?;
        if attr.key.local_name().as_ref() == b"val" {
            return attr.unescape_value().ok().map(|v| v.to_string());
        }
    }
    None
}

fn is_on(val: Option<&str>) -> bool {
    matches!(val, Some("1") | Some("on") | Some("true"))
}

/// Brace a rendered sub-expression unless it is a single character.
fn group(s: &str) -> String {
    if s.chars().count() == 1 {
        s.to_string()
    } else {
        format!("{{{}}}", s)
    }
}

fn delimiter_latex(chr: Option<&str>, default: &str) -> String {
    let c = match chr {
        None => default,
        Some("") => return ".".to_string(),
        Some(c) => c,
    };
    match c {
        "{" => "\\{".to_string(),
        "}" => "\\}".to_string(),
        "⟨" => "\\langle ".to_string(),
        "⟩" => "\\rangle ".to_string(),
        "⌊" => "\\lfloor ".to_string(),
        "⌋" => "\\rfloor ".to_string(),
        "⌈" => "\\lceil ".to_string(),
        "⌉" => "\\rceil ".to_string(),
        "‖" => "\\|".to_string(),
        other => other.to_string(),
    }
}

fn nary_operator(c: char) -> String {
    match c {
        '∑' => "\\sum".to_string(),
        '∏' => "\\prod".to_string(),
        '∐' => "\\coprod".to_string(),
        '∫' => "\\int".to_string(),
        '∬' => "\\iint".to_string(),
        '∭' => "\\iiint".to_string(),
        '∮' => "\\oint".to_string(),
        '⋃' => "\\bigcup".to_string(),
        '⋂' => "\\bigcap".to_string(),
        '⋁' => "\\bigvee".to_string(),
        '⋀' => "\\bigwedge".to_string(),
        '⨁' => "\\bigoplus".to_string(),
        '⨂' => "\\bigotimes".to_string(),
        other => other.to_string(),
    }
}

fn function_command(name: &str) -> String {
    const KNOWN: &[&str] = &[
        "sin", "cos", "tan", "cot", "sec", "csc", "sinh", "cosh", "tanh", "log", "ln", "exp",
        "lim", "min", "max", "arg", "det", "gcd",
    ];
    if KNOWN.contains(&name) {
        format!("\\{}", name)
    } else {
        name.to_string()
    }
}

fn symbol_command(c: char) -> Option<&'static str> {
    Some(match c {
        'α' => "\\alpha",
        'β' => "\\beta",
        'γ' => "\\gamma",
        'δ' => "\\delta",
        'ε' => "\\epsilon",
        'ζ' => "\\zeta",
        'η' => "\\eta",
        'θ' => "\\theta",
        'ι' => "\\iota",
        'κ' => "\\kappa",
        'λ' => "\\lambda",
        'μ' => "\\mu",
        'ν' => "\\nu",
        'ξ' => "\\xi",
        'π' => "\\pi",
        'ρ' => "\\rho",
        'σ' => "\\sigma",
        'τ' => "\\tau",
        'υ' => "\\upsilon",
        'φ' => "\\phi",
        'χ' => "\\chi",
        'ψ' => "\\psi",
        'ω' => "\\omega",
        'Γ' => "\\Gamma",
        'Δ' => "\\Delta",
        'Θ' => "\\Theta",
        'Λ' => "\\Lambda",
        'Ξ' => "\\Xi",
        'Π' => "\\Pi",
        'Σ' => "\\Sigma",
        'Υ' => "\\Upsilon",
        'Φ' => "\\Phi",
        'Ψ' => "\\Psi",
        'Ω' => "\\Omega",
        '±' => "\\pm",
        '∓' => "\\mp",
        '×' => "\\times",
        '÷' => "\\div",
        '⋅' => "\\cdot",
        '∘' => "\\circ",
        '≤' => "\\leq",
        '≥' => "\\geq",
        '≠' => "\\neq",
        '≈' => "\\approx",
        '≡' => "\\equiv",
        '∝' => "\\propto",
        '∞' => "\\infty",
        '→' => "\\to",
        '←' => "\\leftarrow",
        '⇒' => "\\Rightarrow",
        '⇐' => "\\Leftarrow",
        '↔' => "\\leftrightarrow",
        '∈' => "\\in",
        '∉' => "\\notin",
        '⊂' => "\\subset",
        '⊆' => "\\subseteq",
        '∪' => "\\cup",
        '∩' => "\\cap",
        '∅' => "\\emptyset",
        '∀' => "\\forall",
        '∃' => "\\exists",
        '¬' => "\\neg",
        '∧' => "\\wedge",
        '∨' => "\\vee",
        '∂' => "\\partial",
        '∇' => "\\nabla",
        'ℝ' => "\\mathbb{R}",
        'ℤ' => "\\mathbb{Z}",
        'ℕ' => "\\mathbb{N}",
        'ℚ' => "\\mathbb{Q}",
        'ℂ' => "\\mathbb{C}",
        '…' => "\\ldots",
        '⋯' => "\\cdots",
        'ℏ' => "\\hbar",
        '−' => "-",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_run() {
        let xml = "<m:oMath><m:r><m:t>x+y</m:t></m:r></m:oMath>";
        assert_eq!(omml_to_latex(xml).as_deref(), Some("x+y"));
    }

    #[test]
    fn superscript() {
        let xml = "<m:oMath><m:r><m:t>E=m</m:t></m:r><m:sSup>\
                   <m:e><m:r><m:t>c</m:t></m:r></m:e>\
                   <m:sup><m:r><m:t>2</m:t></m:r></m:sup>\
                   </m:sSup></m:oMath>";
        assert_eq!(omml_to_latex(xml).as_deref(), Some("E=mc^{2}"));
    }

    #[test]
    fn fraction() {
        let xml = "<m:oMath><m:f>\
                   <m:num><m:r><m:t>1</m:t></m:r></m:num>\
                   <m:den><m:r><m:t>2</m:t></m:r></m:den>\
                   </m:f></m:oMath>";
        assert_eq!(omml_to_latex(xml).as_deref(), Some("\\frac{1}{2}"));
    }

    #[test]
    fn square_root_with_hidden_degree() {
        let xml = "<m:oMath><m:rad>\
                   <m:radPr><m:degHide m:val=\"1\"/></m:radPr>\
                   <m:deg/>\
                   <m:e><m:r><m:t>x</m:t></m:r></m:e>\
                   </m:rad></m:oMath>";
        assert_eq!(omml_to_latex(xml).as_deref(), Some("\\sqrt{x}"));
    }

    #[test]
    fn sum_with_limits() {
        let xml = "<m:oMath><m:nary>\
                   <m:naryPr><m:chr m:val=\"∑\"/></m:naryPr>\
                   <m:sub><m:r><m:t>i=1</m:t></m:r></m:sub>\
                   <m:sup><m:r><m:t>n</m:t></m:r></m:sup>\
                   <m:e><m:r><m:t>i</m:t></m:r></m:e>\
                   </m:nary></m:oMath>";
        assert_eq!(omml_to_latex(xml).as_deref(), Some("\\sum_{i=1}^{n} i"));
    }

    #[test]
    fn parenthesised_expression() {
        let xml = "<m:oMath><m:d>\
                   <m:e><m:r><m:t>a+b</m:t></m:r></m:e>\
                   </m:d></m:oMath>";
        assert_eq!(omml_to_latex(xml).as_deref(), Some("\\left(a+b\\right)"));
    }

    #[test]
    fn greek_letters_mapped() {
        let xml = "<m:oMath><m:r><m:t>α+β</m:t></m:r></m:oMath>";
        let latex = omml_to_latex(xml).unwrap();
        assert!(latex.contains("\\alpha"));
        assert!(latex.contains("\\beta"));
    }

    #[test]
    fn special_chars_escaped() {
        let xml = "<m:oMath><m:r><m:t>50%</m:t></m:r></m:oMath>";
        assert_eq!(omml_to_latex(xml).as_deref(), Some("50\\%"));
    }

    #[test]
    fn truncated_fragment_is_none() {
        assert_eq!(omml_to_latex("<m:oMath><m:f><m:num>"), None);
    }

    #[test]
    fn empty_fragment_is_none() {
        assert_eq!(omml_to_latex("<m:oMath></m:oMath>"), None);
    }
}
