//! Renders a ledger snapshot as an SVG table, keeping row and cell colors.

use crate::domain::CellColor;

const ROW_HEIGHT: u32 = 28;
const TITLE_HEIGHT: u32 = 40;
const FIRST_COL_WIDTH: u32 = 200;
const COL_WIDTH: u32 = 96;
const PADDING: u32 = 8;
const HEADER_FILL: &str = "#e8e8e8";
const GRID: &str = "#9e9e9e";

/// One rendered cell. `fill` overrides the row color.
#[derive(Debug, Clone)]
pub struct SnapshotCell {
    pub text: String,
    pub fill: Option<CellColor>,
}

#[derive(Debug, Clone)]
pub struct SnapshotRow {
    pub fill: Option<CellColor>,
    pub cells: Vec<SnapshotCell>,
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn col_x(col: usize) -> u32 {
    if col == 0 {
        0
    } else {
        FIRST_COL_WIDTH + (col as u32 - 1) * COL_WIDTH
    }
}

fn col_width(col: usize) -> u32 {
    if col == 0 { FIRST_COL_WIDTH } else { COL_WIDTH }
}

/// Build the SVG document. Columns are laid out in `header` order.
pub fn render_table(title: &str, header: &[&str], rows: &[SnapshotRow]) -> String {
    let cols = header.len().max(1);
    let width = col_x(cols - 1) + col_width(cols - 1);
    let height = TITLE_HEIGHT + ROW_HEIGHT * (rows.len() as u32 + 1);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\" font-size=\"14\">\n",
        w = width,
        h = height
    ));
    svg.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"#ffffff\"/>\n",
        width, height
    ));
    svg.push_str(&format!(
        "<text x=\"{}\" y=\"{}\" font-size=\"18\" font-weight=\"bold\">{}</text>\n",
        PADDING,
        TITLE_HEIGHT - 12,
        escape_xml(title)
    ));

    // Header
    let y = TITLE_HEIGHT;
    for (col, name) in header.iter().enumerate() {
        push_cell(&mut svg, col, y, name, Some(HEADER_FILL), true);
    }

    for (i, row) in rows.iter().enumerate() {
        let y = TITLE_HEIGHT + ROW_HEIGHT * (i as u32 + 1);
        for col in 0..cols {
            let cell = row.cells.get(col);
            let text = cell.map(|c| c.text.as_str()).unwrap_or("");
            let fill = cell.and_then(|c| c.fill).or(row.fill).map(CellColor::hex);
            push_cell(&mut svg, col, y, text, fill, false);
        }
    }

    svg.push_str("</svg>\n");
    svg
}

fn push_cell(svg: &mut String, col: usize, y: u32, text: &str, fill: Option<&str>, bold: bool) {
    let x = col_x(col);
    let w = col_width(col);
    svg.push_str(&format!(
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" stroke=\"{}\"/>\n",
        x,
        y,
        w,
        ROW_HEIGHT,
        fill.unwrap_or("#ffffff"),
        GRID
    ));
    if text.is_empty() {
        return;
    }
    let (anchor, tx) = if col == 0 {
        ("start", x + PADDING)
    } else {
        ("middle", x + w / 2)
    };
    svg.push_str(&format!(
        "<text x=\"{}\" y=\"{}\" text-anchor=\"{}\"{}>{}</text>\n",
        tx,
        y + ROW_HEIGHT - 9,
        anchor,
        if bold { " font-weight=\"bold\"" } else { "" },
        escape_xml(text)
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(text: &str, fill: Option<CellColor>) -> SnapshotCell {
        SnapshotCell {
            text: text.to_string(),
            fill,
        }
    }

    #[test]
    fn test_render_colors_and_escaping() {
        let rows = vec![
            SnapshotRow {
                fill: Some(CellColor::Green),
                cells: vec![cell("Сунко", None), cell("", None)],
            },
            SnapshotRow {
                fill: None,
                cells: vec![cell("A<B>", None), cell("+", Some(CellColor::Red))],
            },
        ];
        let svg = render_table("Итоги", &["Фамилия", "Обед"], &rows);
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(CellColor::Green.hex()));
        assert!(svg.contains(CellColor::Red.hex()));
        assert!(svg.contains("A&lt;B&gt;"));
        assert!(svg.contains(">Сунко</text>"));
        assert!(!svg.contains("A<B>"));
    }

    #[test]
    fn test_dimensions_follow_rows() {
        let svg = render_table("t", &["a", "b", "c"], &[]);
        let width = FIRST_COL_WIDTH + 2 * COL_WIDTH;
        assert!(svg.contains(&format!("width=\"{}\" height=\"{}\"", width, TITLE_HEIGHT + ROW_HEIGHT)));
    }
}
