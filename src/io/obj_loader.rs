//! Geometry text (OBJ subset) parsing.
//!
//! A single line-oriented parser, [`parse_geometry`], fills the attribute arrays and
//! reports material switches and accepted faces to a callback. The geometry-only and
//! material-grouped builders are thin consumers of it.

use crate::io::diagnostics::{Diagnostic, DiagnosticKind, Parsed};
use crate::scene::mesh::{Face, FaceCorner, GroupedMesh, MaterialGroups, ObjMesh, VertexData};

/// Things the parser reports while walking the text, in source order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryEvent<'a> {
    /// `usemtl <name>`: subsequent faces belong to `name`.
    UseMaterial(&'a str),
    /// A face with 3 or 4 valid corners. It is also stored in [`VertexData::faces`].
    Face(&'a Face),
}

/// A line that refers to positions, held back until every position is known.
enum Deferred<'t> {
    UseMaterial(&'t str),
    Face { line: usize, face: Face },
}

/// Parses geometry text into flat arrays, calling `on_event` for every material switch
/// and every accepted face, in source order.
///
/// Faces may refer to positions declared later in the text, so faces and material
/// switches are replayed once the whole text has been read. Malformed lines are dropped
/// with a diagnostic; unknown directives are ignored.
pub fn parse_geometry<F>(text: &str, mut on_event: F) -> Parsed<VertexData>
where
    F: FnMut(GeometryEvent<'_>),
{
    let mut data = VertexData::default();
    let mut diagnostics = Vec::new();
    let mut deferred = Vec::new();

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

        let outcome = match keyword {
            "v" => parse_floats::<3>(keyword, &args).map(|p| data.positions.extend(p)),
            "vn" => parse_floats::<3>(keyword, &args).map(|n| data.normals.extend(n)),
            "vt" => parse_floats::<2>(keyword, &args).map(|t| data.texcoords.extend(t)),
            "usemtl" => {
                let name = line[keyword.len()..].trim();
                if name.is_empty() {
                    Err(too_few(keyword, 1, 0))
                } else {
                    deferred.push(Deferred::UseMaterial(name));
                    Ok(())
                }
            }
            "f" => parse_face(&args, &data).map(|face| {
                deferred.push(Deferred::Face {
                    line: line_idx + 1,
                    face,
                })
            }),
            _ => Ok(()),
        };

        if let Err(kind) = outcome {
            diagnostics.push(Diagnostic::new(line_idx + 1, kind));
        }
    }

    let (positions, texcoords, normals) = (
        data.position_count(),
        data.texcoord_count(),
        data.normal_count(),
    );
    for entry in deferred {
        match entry {
            Deferred::UseMaterial(name) => on_event(GeometryEvent::UseMaterial(name)),
            Deferred::Face { line, mut face } => {
                let outside = face.corners.iter().find(|c| c.position as usize >= positions);
                if let Some(corner) = outside {
                    diagnostics.push(Diagnostic::new(
                        line,
                        DiagnosticKind::IndexOutOfRange {
                            index: i64::from(corner.position) + 1,
                            available: positions,
                        },
                    ));
                    continue;
                }
                for corner in &mut face.corners {
                    corner.texcoord = corner.texcoord.filter(|&t| (t as usize) < texcoords);
                    corner.normal = corner.normal.filter(|&n| (n as usize) < normals);
                }
                on_event(GeometryEvent::Face(&face));
                data.faces.push(face);
            }
        }
    }
    diagnostics.sort_by_key(|d| d.line);

    Parsed {
        value: data,
        diagnostics,
    }
}

/// Geometry-only path: arrays plus one flat triangle index list.
pub fn parse_obj(text: &str) -> Parsed<ObjMesh> {
    let mut indices = Vec::new();
    let parsed = parse_geometry(text, |event| {
        if let GeometryEvent::Face(face) = event {
            indices.extend(face.triangle_indices());
        }
    });
    parsed.map(|data| ObjMesh { data, indices })
}

/// Material-grouped path: arrays plus one triangle index list per active material.
///
/// Faces seen before any `usemtl` go to the unset (`None`) group.
pub fn parse_obj_grouped(text: &str) -> Parsed<GroupedMesh> {
    let mut groups = MaterialGroups::default();
    let mut current: Option<String> = None;
    let parsed = parse_geometry(text, |event| match event {
        GeometryEvent::UseMaterial(name) => current = Some(name.to_owned()),
        GeometryEvent::Face(face) => groups.extend(current.as_deref(), face.triangle_indices()),
    });
    parsed.map(|data| GroupedMesh { data, groups })
}

fn too_few(directive: &str, expected: usize, found: usize) -> DiagnosticKind {
    DiagnosticKind::TooFewArguments {
        directive: directive.to_owned(),
        expected,
        found,
    }
}

fn parse_floats<const N: usize>(directive: &str, args: &[&str]) -> Result<[f32; N], DiagnosticKind> {
    if args.len() < N {
        return Err(too_few(directive, N, args.len()));
    }
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(args) {
        *slot = token.parse().map_err(|_| DiagnosticKind::InvalidNumber {
            directive: directive.to_owned(),
            token: (*token).to_owned(),
        })?;
    }
    Ok(out)
}

fn parse_face(args: &[&str], data: &VertexData) -> Result<Face, DiagnosticKind> {
    match args.len() {
        0..=2 => return Err(too_few("f", 3, args.len())),
        3 | 4 => {}
        n => return Err(DiagnosticKind::UnsupportedFaceArity(n)),
    }

    let corners = args
        .iter()
        .map(|token| parse_corner(token, data))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Face { corners })
}

/// `p`, `p/t`, `p//n` or `p/t/n`. Only the position is mandatory; a texcoord or normal
/// reference that does not resolve is dropped from the corner.
///
/// Negative references are resolved against what `data` holds so far. Positive ones are
/// range-checked by the caller once the whole text is read.
fn parse_corner(token: &str, data: &VertexData) -> Result<FaceCorner, DiagnosticKind> {
    let mut parts = token.split('/');
    let raw_position = parts
        .next()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| DiagnosticKind::InvalidCorner(token.to_owned()))?;

    let declared = data.position_count();
    let position = resolve_index(raw_position, declared).ok_or(DiagnosticKind::IndexOutOfRange {
        index: raw_position,
        available: declared,
    })?;

    let mut optional = |declared: usize| {
        parts
            .next()
            .and_then(|s| s.parse::<i64>().ok())
            .and_then(|raw| resolve_index(raw, declared))
    };
    let texcoord = optional(data.texcoord_count());
    let normal = optional(data.normal_count());

    Ok(FaceCorner {
        position,
        texcoord,
        normal,
    })
}

/// 1-based forward index, or negative index relative to the `declared` elements so far.
/// `None` for 0, for a negative index reaching before the first element, or for an index
/// that does not fit in `u32`.
fn resolve_index(raw: i64, declared: usize) -> Option<u32> {
    let index = match raw {
        0 => return None,
        r if r > 0 => r - 1,
        r => declared as i64 + r,
    };
    u32::try_from(index).ok()
}
