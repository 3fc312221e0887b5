use crate::graph::Direction;

/// Generate an SVG path segment for a bezier spoke between two points.
///
/// Creates a horizontal-biased cubic bezier curve: control points extend
/// horizontally out of `from` and into `to`. Very short spokes become a
/// straight line to avoid zig-zags.
///
/// # Arguments
/// * `from` - Start point
/// * `to` - End point
/// * `zoom` - Current zoom level (affects control point offset)
/// * `min_offset` - Minimum control point offset (default: 50.0)
///
/// # Returns
/// SVG path command string (e.g., "M 10 20 C 60 20 90 80 140 80")
pub fn generate_bezier_path(from: (f32, f32), to: (f32, f32), zoom: f32, min_offset: f32) -> String {
    let (start_x, start_y) = from;
    let (end_x, end_y) = to;
    let dx = end_x - start_x;
    let dy = end_y - start_y;
    let threshold = 10.0 * zoom;

    if dx * dx + dy * dy < threshold * threshold {
        return format!("M {} {} L {} {}", start_x, start_y, end_x, end_y);
    }

    let offset = (dx.abs() * 0.5).max(min_offset * zoom);
    format!(
        "M {} {} C {} {} {} {} {} {}",
        start_x,
        start_y,
        start_x + offset,
        start_y,
        end_x - offset,
        end_y,
        end_x,
        end_y
    )
}

/// Generate SVG path commands drawing a channel as spokes around its hub.
///
/// Output pins feed the hub, so their spoke runs pin → hub; input pins are
/// fed by it, so theirs runs hub → pin. Spokes are emitted in the given
/// order, separated by a space.
pub fn generate_channel_path(
    hub: (f32, f32),
    spokes: &[(Direction, (f32, f32))],
    zoom: f32,
    min_offset: f32,
) -> String {
    spokes
        .iter()
        .map(|&(direction, pin)| match direction {
            Direction::Output => generate_bezier_path(pin, hub, zoom, min_offset),
            Direction::Input => generate_bezier_path(hub, pin, zoom, min_offset),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generate the path of the wire dragged out of a pin towards the cursor.
pub fn generate_drag_path(
    pin: (f32, f32),
    direction: Direction,
    cursor: (f32, f32),
    zoom: f32,
    min_offset: f32,
) -> String {
    match direction {
        Direction::Output => generate_bezier_path(pin, cursor, zoom, min_offset),
        Direction::Input => generate_bezier_path(cursor, pin, zoom, min_offset),
    }
}
