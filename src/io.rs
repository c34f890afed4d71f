// SPDX-License-Identifier: Apache-2.0

//! Text formats for problem instances and placements.
//!
//! An instance starts with the chip line `x_min x_max y_min y_max`, followed
//! by one line per rectangle, either `width height` or a blockage
//! `B x_min x_max y_min y_max`, and then by nets: `Net weight` followed by
//! one `rect x y` line per pin. A pin on rectangle `-1` is fixed at chip
//! coordinates `(x, y)`; other indices count movable rectangles only.
//!
//! A solution has one `x_min x_max y_min y_max mirrored rotation` line per
//! movable rectangle, where `mirrored` is 0 or 1 and `rotation` counts
//! quarter turns.
//!
//! Blank lines and lines starting with `#` are ignored.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::{
    BoundingBox, FloorplanError, Net, Orientation, Packing, Pin, Pos, Rectangle, Rotation,
};

static PATTERNS: LazyLock<Patterns> = LazyLock::new(Patterns::new);

struct Patterns {
    bounds: Regex,
    rectangle: Regex,
    blockage: Regex,
    net: Regex,
    pin: Regex,
    placement: Regex,
}

impl Patterns {
    fn new() -> Patterns {
        let int = r"(-?\d+)";
        let line = |body: String| {
            Regex::new(&format!(r"^\s*{body}\s*$")).expect("Failed to compile regex")
        };
        let ints = |count: usize| vec![int; count].join(r"\s+");
        Patterns {
            bounds: line(ints(4)),
            rectangle: line(ints(2)),
            blockage: line(format!(r"B\s+{}", ints(4))),
            net: line(format!(r"Net\s+{int}")),
            pin: line(ints(3)),
            placement: line(format!(r"{}\s+(\d+)\s+(\d+)", ints(4))),
        }
    }
}

/// Non-blank, non-comment lines with their 1-based line numbers.
fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn int(captures: &Captures, group: usize, line: usize) -> Result<Pos, FloorplanError> {
    let text = &captures[group];
    text.parse()
        .map_err(|_| FloorplanError::parse(line, format!("number {text} is out of range")))
}

/// Reads `x_min x_max y_min y_max` starting at capture group `first`.
fn bounds(captures: &Captures, first: usize, line: usize) -> Result<BoundingBox, FloorplanError> {
    let bbox = BoundingBox {
        min_x: int(captures, first, line)?,
        max_x: int(captures, first + 1, line)?,
        min_y: int(captures, first + 2, line)?,
        max_y: int(captures, first + 3, line)?,
    };
    if bbox.min_x > bbox.max_x || bbox.min_y > bbox.max_y {
        return Err(FloorplanError::parse(
            line,
            format!(
                "inconsistent bounds [{}, {}] x [{}, {}]",
                bbox.min_x, bbox.max_x, bbox.min_y, bbox.max_y
            ),
        ));
    }
    Ok(bbox)
}

/// Parses an instance. See the module documentation for the format.
pub fn parse_instance(text: &str) -> Result<Packing, FloorplanError> {
    let patterns = &*PATTERNS;
    let mut lines = content_lines(text);

    let (line, first) = lines
        .next()
        .ok_or_else(|| FloorplanError::parse(1, "missing chip bounds"))?;
    let captures = patterns
        .bounds
        .captures(first)
        .ok_or_else(|| {
            FloorplanError::parse(line, format!("expected chip bounds, got `{first}`"))
        })?;
    let chip_base = Rectangle::placed_at(0, bounds(&captures, 1, line)?);

    let mut rectangles = Vec::new();
    let mut movable = 0;
    let mut nets: Vec<Net> = Vec::new();

    for (line, text) in lines {
        if let Some(captures) = patterns.net.captures(text) {
            let weight = int(&captures, 1, line)?;
            if weight <= 0 {
                return Err(FloorplanError::parse(
                    line,
                    format!("net weight must be positive, got {weight}"),
                ));
            }
            nets.push(Net::new(weight, Vec::new()));
        } else if let Some(captures) = patterns.pin.captures(text) {
            let Some(net) = nets.last_mut() else {
                return Err(FloorplanError::parse(line, "pin outside of a net"));
            };
            let (x, y) = (int(&captures, 2, line)?, int(&captures, 3, line)?);
            let pin = match int(&captures, 1, line)? {
                -1 => Pin::fixed(x, y),
                rect if rect >= 0 && (rect as usize) < movable => {
                    Pin::on_rectangle(rect as usize, x, y)
                }
                rect => {
                    return Err(FloorplanError::parse(
                        line,
                        format!("pin refers to rectangle {rect}, but there are {movable}"),
                    ));
                }
            };
            net.pins.push(pin);
        } else if !nets.is_empty() {
            return Err(FloorplanError::parse(
                line,
                format!("expected a net or a pin, got `{text}`"),
            ));
        } else if let Some(captures) = patterns.blockage.captures(text) {
            rectangles.push(Rectangle::blockage(0, bounds(&captures, 1, line)?));
        } else if let Some(captures) = patterns.rectangle.captures(text) {
            let (width, height) = (int(&captures, 1, line)?, int(&captures, 2, line)?);
            if width < 0 || height < 0 {
                return Err(FloorplanError::parse(
                    line,
                    format!("negative rectangle size {width}x{height}"),
                ));
            }
            rectangles.push(Rectangle::new(movable, width, height));
            movable += 1;
        } else {
            return Err(FloorplanError::parse(
                line,
                format!("expected a rectangle, a blockage or a net, got `{text}`"),
            ));
        }
    }

    log::debug!(
        "Parsed instance with {movable} rectangles, {} blockages and {} nets",
        rectangles.len() - movable,
        nets.len()
    );
    Packing::new(chip_base, rectangles, nets)
}

pub fn read_instance<P: AsRef<Path>>(path: P) -> Result<Packing, FloorplanError> {
    parse_instance(&fs::read_to_string(path)?)
}

/// Applies a solution to a copy of `instance`. Rectangle sizes in the
/// solution must agree with the instance under the given rotation.
pub fn parse_solution(instance: &Packing, text: &str) -> Result<Packing, FloorplanError> {
    let patterns = &*PATTERNS;
    let mut packing = instance.clone();
    packing.clear_placement();

    let mut count = 0;
    let mut last_line = 0;
    for (line, text) in content_lines(text) {
        last_line = line;
        if count == packing.num_rects() {
            return Err(FloorplanError::parse(
                line,
                format!("expected {} rectangles, found more", packing.num_rects()),
            ));
        }
        let captures = patterns.placement.captures(text).ok_or_else(|| {
            FloorplanError::parse(line, format!("expected a placed rectangle, got `{text}`"))
        })?;

        let bbox = bounds(&captures, 1, line)?;
        let mirrored = match &captures[5] {
            "0" => false,
            "1" => true,
            other => {
                return Err(FloorplanError::parse(
                    line,
                    format!("mirror flag must be 0 or 1, got {other}"),
                ));
            }
        };
        let rotation = captures[6]
            .parse::<u8>()
            .ok()
            .and_then(Rotation::from_code)
            .ok_or_else(|| {
                FloorplanError::parse(line, format!("invalid rotation {}", &captures[6]))
            })?;

        let rect = packing.rect_mut(count);
        rect.set_orientation(Orientation::new(rotation, mirrored));
        if rect.width() != bbox.width() || rect.height() != bbox.height() {
            return Err(FloorplanError::parse(
                line,
                format!(
                    "rectangle {count} is {}x{} in this orientation, but the solution gives {}x{}",
                    rect.width(),
                    rect.height(),
                    bbox.width(),
                    bbox.height()
                ),
            ));
        }
        rect.place_at(bbox.min_x, bbox.min_y);
        count += 1;
    }

    if count != packing.num_rects() {
        return Err(FloorplanError::parse(
            last_line + 1,
            format!("expected {} rectangles, found {count}", packing.num_rects()),
        ));
    }
    Ok(packing)
}

/// Renders the placement of every movable rectangle.
pub fn write_solution(packing: &Packing) -> Result<String, FloorplanError> {
    let mut s = String::new();
    for rect in packing.rects() {
        let bbox = rect
            .try_bbox()
            .ok_or(FloorplanError::Unplaced { rect: rect.id() })?;
        s.push_str(&format!(
            "{} {} {} {} {} {}\n",
            bbox.min_x,
            bbox.max_x,
            bbox.min_y,
            bbox.max_y,
            u8::from(rect.mirrored()),
            rect.rotation().code()
        ));
    }
    Ok(s)
}

pub fn write_solution_file<P: AsRef<Path>>(
    path: P,
    packing: &Packing,
) -> Result<(), FloorplanError> {
    let text = write_solution(packing)?;
    fs::write(path, text)?;
    Ok(())
}
