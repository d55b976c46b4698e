//! Material text (MTL subset) parsing.

use crate::io::diagnostics::{Diagnostic, DiagnosticKind, Parsed};
use crate::scene::material::{Material, MaterialTable};
use nalgebra::Vector3;

/// Parses material text into a name -> [`Material`] table.
///
/// `newmtl` starts a record keyed by the rest of the line (names may contain spaces).
/// Property lines before the first `newmtl` are discarded with a diagnostic, as are
/// unknown keywords and lines with missing or non-numeric arguments.
pub fn parse_mtl(text: &str) -> Parsed<MaterialTable> {
    let mut materials = MaterialTable::new();
    let mut diagnostics = Vec::new();
    let mut current: Option<String> = None;

    for (line_idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };
        let args: Vec<&str> = tokens.collect();

        if keyword == "newmtl" {
            let name = line[keyword.len()..].trim();
            if name.is_empty() {
                diagnostics.push(Diagnostic::new(
                    line_idx + 1,
                    DiagnosticKind::TooFewArguments {
                        directive: keyword.to_owned(),
                        expected: 1,
                        found: 0,
                    },
                ));
                continue;
            }
            materials.insert(name.to_owned(), Material::default());
            current = Some(name.to_owned());
            continue;
        }

        let outcome = match current.as_ref().and_then(|name| materials.get_mut(name)) {
            Some(material) => apply_property(material, keyword, &args),
            None if is_property(keyword) => {
                Err(DiagnosticKind::PropertyWithoutMaterial(keyword.to_owned()))
            }
            None => Err(DiagnosticKind::UnknownKeyword(keyword.to_owned())),
        };

        if let Err(kind) = outcome {
            diagnostics.push(Diagnostic::new(line_idx + 1, kind));
        }
    }

    Parsed {
        value: materials,
        diagnostics,
    }
}

fn is_property(keyword: &str) -> bool {
    matches!(keyword, "Ns" | "Ka" | "Kd" | "Ks" | "Ke" | "Ni" | "d" | "illum")
}

fn apply_property(material: &mut Material, keyword: &str, args: &[&str]) -> Result<(), DiagnosticKind> {
    match keyword {
        "Ns" => material.shininess = Some(scalar(keyword, args)?),
        "Ka" => material.ambient = Some(color(keyword, args)?),
        "Kd" => material.diffuse = Some(color(keyword, args)?),
        "Ks" => material.specular = Some(color(keyword, args)?),
        "Ke" => material.emissive = Some(color(keyword, args)?),
        "Ni" => material.optical_density = Some(scalar(keyword, args)?),
        "d" => material.opacity = Some(scalar(keyword, args)?),
        "illum" => {
            let token = first(keyword, args)?;
            let model = token.parse().map_err(|_| invalid(keyword, token))?;
            material.illumination_model = Some(model);
        }
        _ => return Err(DiagnosticKind::UnknownKeyword(keyword.to_owned())),
    }
    Ok(())
}

fn first<'a>(keyword: &str, args: &[&'a str]) -> Result<&'a str, DiagnosticKind> {
    args.first().copied().ok_or_else(|| DiagnosticKind::TooFewArguments {
        directive: keyword.to_owned(),
        expected: 1,
        found: 0,
    })
}

fn invalid(keyword: &str, token: &str) -> DiagnosticKind {
    DiagnosticKind::InvalidNumber {
        directive: keyword.to_owned(),
        token: token.to_owned(),
    }
}

fn scalar(keyword: &str, args: &[&str]) -> Result<f32, DiagnosticKind> {
    let token = first(keyword, args)?;
    token.parse().map_err(|_| invalid(keyword, token))
}

/// `r g b`, or a single `r` meaning `r r r`.
fn color(keyword: &str, args: &[&str]) -> Result<Vector3<f32>, DiagnosticKind> {
    let values = args
        .iter()
        .take(3)
        .map(|t| t.parse::<f32>().map_err(|_| invalid(keyword, t)))
        .collect::<Result<Vec<_>, _>>()?;

    match values[..] {
        [r, g, b] => Ok(Vector3::new(r, g, b)),
        [v] => Ok(Vector3::new(v, v, v)),
        _ => Err(DiagnosticKind::TooFewArguments {
            directive: keyword.to_owned(),
            expected: 3,
            found: values.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_diffuse_material() {
        let parsed = parse_mtl("newmtl A\nKd 1 0 0");
        assert_eq!(parsed.value.len(), 1);
        assert_eq!(parsed.value["A"].diffuse, Some(Vector3::new(1.0, 0.0, 0.0)));
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn diffuse_and_opacity() {
        let table = parse_mtl("newmtl Red\nKd 1 0 0\nd 0.5").value;
        let expected = Material {
            diffuse: Some(Vector3::new(1.0, 0.0, 0.0)),
            opacity: Some(0.5),
            ..Default::default()
        };
        assert_eq!(table["Red"], expected);
    }

    #[test]
    fn full_blender_export() {
        let text = "\
# Blender MTL File: 'pensil.blend'
# Material Count: 2

newmtl Material.001
Ns 250.000000
Ka 1.000000 1.000000 1.000000
Kd 0.800000 0.318547 0.000000
Ks 0.500000 0.500000 0.500000
Ke 0.000000 0.000000 0.000000
Ni 1.450000
d 1.000000
illum 2

newmtl Material.002
Kd 0.2 0.1 0.05
";
        let parsed = parse_mtl(text);
        assert!(parsed.diagnostics.is_empty());

        let m = &parsed.value["Material.001"];
        assert_eq!(m.shininess, Some(250.0));
        assert_eq!(m.ambient, Some(Vector3::new(1.0, 1.0, 1.0)));
        assert_eq!(m.diffuse, Some(Vector3::new(0.8, 0.318547, 0.0)));
        assert_eq!(m.specular, Some(Vector3::new(0.5, 0.5, 0.5)));
        assert_eq!(m.emissive, Some(Vector3::zeros()));
        assert_eq!(m.optical_density, Some(1.45));
        assert_eq!(m.opacity, Some(1.0));
        assert_eq!(m.illumination_model, Some(2));

        let other = &parsed.value["Material.002"];
        assert_eq!(other.shininess, None);
        assert_eq!(other.opacity, None);
    }

    #[test]
    fn names_may_contain_spaces() {
        let table = parse_mtl("newmtl Pencil Body\nKd 0.36 0.2 0.09\n").value;
        assert!(table.contains_key("Pencil Body"));
    }

    #[test]
    fn unknown_keywords_are_reported_and_ignored() {
        let parsed = parse_mtl("newmtl A\nmap_Kd wood.png\nKd 0 1 0\n");
        assert_eq!(parsed.value["A"].diffuse, Some(Vector3::new(0.0, 1.0, 0.0)));
        assert_eq!(
            parsed.diagnostics,
            vec![Diagnostic::new(2, DiagnosticKind::UnknownKeyword("map_Kd".into()))]
        );
    }

    #[test]
    fn property_before_newmtl_is_discarded() {
        let parsed = parse_mtl("Kd 1 1 1\nnewmtl A\n");
        assert_eq!(parsed.value["A"], Material::default());
        assert_eq!(
            parsed.diagnostics,
            vec![Diagnostic::new(1, DiagnosticKind::PropertyWithoutMaterial("Kd".into()))]
        );
    }

    #[test]
    fn single_component_color_is_gray() {
        let table = parse_mtl("newmtl A\nKa 0.25\n").value;
        assert_eq!(table["A"].ambient, Some(Vector3::new(0.25, 0.25, 0.25)));
    }

    #[test]
    fn malformed_values_leave_the_property_unset() {
        let parsed = parse_mtl("newmtl A\nKd 1 0\nNs\nillum two\nd x\n");
        assert_eq!(parsed.value["A"], Material::default());
        assert_eq!(parsed.diagnostics.len(), 4);
    }

    #[test]
    fn repeated_newmtl_starts_over() {
        let table = parse_mtl("newmtl A\nKd 1 0 0\nnewmtl A\nNs 10\n").value;
        assert_eq!(table.len(), 1);
        assert_eq!(table["A"].diffuse, None);
        assert_eq!(table["A"].shininess, Some(10.0));
    }
}
