/*!
# Circuit Rendering

Renderings of a circuit: Graphviz DOT and a terminal summary are emitted
as text; SVG and PNG images are drawn with plotters, with the vertices on
a circle (the shell layout retiming figures are usually drawn with).
Vertices are labelled with their key and delay, edges with their register
count.
*/

use std::f64::consts::PI;
use std::path::Path;

use crate::core::error::RetimeError;
use crate::core::types::CircuitGraph;

/// Canvas settings for the image renderers.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Width of the image in pixels
    pub width: u32,
    /// Height of the image in pixels
    pub height: u32,
    /// Radius of the vertex markers
    pub node_radius: f64,
    /// Distance kept between the vertex circle and the canvas border
    pub margin: f64,
    /// Whether to label vertices with their key and delay
    pub show_labels: bool,
    /// Whether to label edges with their register count
    pub show_edge_labels: bool,
    /// Font size for labels
    pub font_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            node_radius: 10.0,
            margin: 60.0,
            show_labels: true,
            show_edge_labels: true,
            font_size: 12,
        }
    }
}

/// Positions the vertices on a circle, in key order, starting at the top.
fn circular_layout(graph: &CircuitGraph, config: &RenderConfig) -> Vec<(f64, f64)> {
    let n = graph.node_count();
    let cx = config.width as f64 / 2.0;
    let cy = config.height as f64 / 2.0;
    let radius = ((config.width.min(config.height) as f64) / 2.0 - config.margin).max(1.0);
    (0..n)
        .map(|k| {
            let angle = 2.0 * PI * k as f64 / n as f64 - PI / 2.0;
            (cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect()
}

/// Renders the circuit as Graphviz DOT. Vertices are labelled with their
/// key and delay, edges with their register count.
pub fn to_dot(graph: &CircuitGraph) -> String {
    let mut out = String::from("digraph circuit {\n    rankdir=LR;\n    node [shape=circle];\n");
    for (id, delay) in graph.nodes() {
        out.push_str(&format!(
            "    v{} [label=\"{}\\nd={}\"];\n",
            id.index(),
            id.index(),
            delay
        ));
    }
    for (u, v, w) in graph.edges() {
        out.push_str(&format!(
            "    v{} -> v{} [label=\"{}\"];\n",
            u.index(),
            v.index(),
            w
        ));
    }
    out.push_str("}\n");
    out
}

/// Renders a terminal summary of the circuit.
pub fn to_ascii(graph: &CircuitGraph) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Circuit: {} vertices, {} edges\n",
        graph.node_count(),
        graph.edge_count()
    ));
    out.push_str(&"=".repeat(40));
    out.push('\n');
    for (id, delay) in graph.nodes() {
        out.push_str(&format!("  [{}] d={}\n", id.index(), delay));
        for (head, w) in graph.out_edges(id) {
            out.push_str(&format!("      -> {} (w={})\n", head.index(), w));
        }
    }
    out
}

/// Saves the circuit as an SVG image using plotters.
pub fn save_as_svg<P: AsRef<Path>>(
    graph: &CircuitGraph,
    path: P,
    config: &RenderConfig,
) -> Result<(), RetimeError> {
    use plotters::prelude::*;

    let positions = circular_layout(graph, config);

    let root = SVGBackend::new(path.as_ref(), (config.width, config.height)).into_drawing_area();

    root.fill(&WHITE)
        .map_err(|e| RetimeError::Io(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(0.0..config.width as f64, 0.0..config.height as f64)
        .map_err(|e| RetimeError::Io(e.to_string()))?;

    // Draw edges
    for (u, v, w) in graph.edges() {
        let pos_u = positions[u.index()];
        let pos_v = positions[v.index()];
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![pos_u, pos_v],
                ShapeStyle::from(&RGBColor(150, 150, 150)).stroke_width(1),
            )))
            .map_err(|e| RetimeError::Io(e.to_string()))?;

        if config.show_edge_labels {
            chart
                .draw_series(std::iter::once(Text::new(
                    format!("{}", w),
                    ((pos_u.0 + pos_v.0) / 2.0, (pos_u.1 + pos_v.1) / 2.0),
                    ("sans-serif", config.font_size).into_font(),
                )))
                .map_err(|e| RetimeError::Io(e.to_string()))?;
        }
    }

    // Draw nodes
    for (id, delay) in graph.nodes() {
        let pos = positions[id.index()];
        chart
            .draw_series(std::iter::once(Circle::new(
                pos,
                config.node_radius as i32,
                ShapeStyle::from(&RGBColor(105, 179, 162)).filled(),
            )))
            .map_err(|e| RetimeError::Io(e.to_string()))?;

        // Draw label if enabled
        if config.show_labels {
            chart
                .draw_series(std::iter::once(Text::new(
                    format!("{} (d={})", id.index(), delay),
                    (pos.0 + config.node_radius + 2.0, pos.1),
                    ("sans-serif", config.font_size).into_font(),
                )))
                .map_err(|e| RetimeError::Io(e.to_string()))?;
        }
    }

    root.present()
        .map_err(|e| RetimeError::Io(e.to_string()))?;

    Ok(())
}

/// Saves the circuit as a PNG image using plotters.
pub fn save_as_png<P: AsRef<Path>>(
    graph: &CircuitGraph,
    path: P,
    config: &RenderConfig,
) -> Result<(), RetimeError> {
    use plotters::prelude::*;

    let positions = circular_layout(graph, config);

    let root =
        BitMapBackend::new(path.as_ref(), (config.width, config.height)).into_drawing_area();

    root.fill(&WHITE)
        .map_err(|e| RetimeError::Io(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(0.0..config.width as f64, 0.0..config.height as f64)
        .map_err(|e| RetimeError::Io(e.to_string()))?;

    // Draw edges
    for (u, v, w) in graph.edges() {
        let pos_u = positions[u.index()];
        let pos_v = positions[v.index()];
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![pos_u, pos_v],
                ShapeStyle::from(&RGBColor(150, 150, 150)).stroke_width(1),
            )))
            .map_err(|e| RetimeError::Io(e.to_string()))?;

        if config.show_edge_labels {
            chart
                .draw_series(std::iter::once(Text::new(
                    format!("{}", w),
                    ((pos_u.0 + pos_v.0) / 2.0, (pos_u.1 + pos_v.1) / 2.0),
                    ("sans-serif", config.font_size).into_font(),
                )))
                .map_err(|e| RetimeError::Io(e.to_string()))?;
        }
    }

    // Draw nodes
    for (id, delay) in graph.nodes() {
        let pos = positions[id.index()];
        chart
            .draw_series(std::iter::once(Circle::new(
                pos,
                config.node_radius as i32,
                ShapeStyle::from(&RGBColor(105, 179, 162)).filled(),
            )))
            .map_err(|e| RetimeError::Io(e.to_string()))?;

        // Draw label if enabled
        if config.show_labels {
            chart
                .draw_series(std::iter::once(Text::new(
                    format!("{} (d={})", id.index(), delay),
                    (pos.0 + config.node_radius + 2.0, pos.1),
                    ("sans-serif", config.font_size).into_font(),
                )))
                .map_err(|e| RetimeError::Io(e.to_string()))?;
        }
    }

    root.present()
        .map_err(|e| RetimeError::Io(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> CircuitGraph {
        CircuitGraph::new(
            &[0, 3, 3, 7],
            &[(0, 1), (1, 2), (1, 3), (2, 3), (3, 0)],
            &[2, 0, 0, 0, 0],
        )
        .unwrap()
    }

    #[test]
    fn test_dot_lists_all_vertices_and_edges() {
        let dot = to_dot(&small());
        assert!(dot.starts_with("digraph circuit {"));
        for k in 0..4 {
            assert!(dot.contains(&format!("v{} [label=", k)));
        }
        assert!(dot.contains("v0 -> v1 [label=\"2\"]"));
        assert!(dot.contains("v3 -> v0 [label=\"0\"]"));
    }

    #[test]
    fn test_ascii_summary() {
        let ascii = to_ascii(&small());
        assert!(ascii.contains("4 vertices, 5 edges"));
        assert!(ascii.contains("[3] d=7"));
        assert!(ascii.contains("-> 0 (w=0)"));
    }

    #[test]
    fn test_save_as_svg() {
        let dir = std::env::temp_dir().join("retime_viz_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("small.svg");
        save_as_svg(&small(), &path, &RenderConfig::default()).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert_eq!(svg.matches("<circle").count(), 4);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_save_as_png() {
        let dir = std::env::temp_dir().join("retime_viz_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("small.png");
        save_as_png(&small(), &path, &RenderConfig::default()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
        std::fs::remove_file(&path).unwrap();
    }
}
