//! ASCII plotting for terminal output.
//!
//! Fixed-size character grid, one glyph per proxy line. Output is
//! deterministic so it can be covered by golden tests.

use chrono::{Datelike, NaiveDate};

use crate::domain::ChartFrame;

/// Glyphs assigned to proxy lines in label order (wraps around).
const GLYPHS: [char; 6] = ['*', 'o', '+', 'x', '#', '@'];

/// Render every proxy line of `frame` on one grid, followed by a legend.
pub fn render_chart(frame: &ChartFrame, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((d_min, d_max)) = frame.period_range() else {
        return format!("Plot: {} | (no data)\n", frame.title);
    };
    let (x_min, x_max) = day_range(d_min, d_max);
    let (y_min, y_max) = value_range(frame).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let labels = frame.labels();
    let mut grid = vec![vec![' '; width]; height];

    let to_cell = |(d, v): (NaiveDate, f64)| {
        (
            map_x(day_number(d), x_min, x_max, width),
            map_y(v, y_min, y_max, height),
        )
    };

    // Lines first (only into blank cells), then vertices on top.
    let mut series = Vec::with_capacity(labels.len());
    for (i, label) in labels.iter().enumerate() {
        let glyph = GLYPHS[i % GLYPHS.len()];
        let mut points = frame.points(label);
        points.sort_by_key(|(d, _)| *d);
        let cells: Vec<(usize, usize)> = points.into_iter().map(&to_cell).collect();
        for pair in cells.windows(2) {
            draw_line(&mut grid, pair[0], pair[1], glyph);
        }
        series.push((glyph, cells));
    }
    for (glyph, cells) in &series {
        for &(x, y) in cells {
            grid[y][x] = *glyph;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} | period=[{d_min}, {d_max}] | y=[{y_min:.2}, {y_max:.2}]\n",
        frame.title
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    for (i, label) in labels.iter().enumerate() {
        out.push_str(&format!("{} {label}\n", GLYPHS[i % GLYPHS.len()]));
    }
    out
}

fn day_number(d: NaiveDate) -> f64 {
    f64::from(d.num_days_from_ce())
}

fn day_range(first: NaiveDate, last: NaiveDate) -> (f64, f64) {
    let (lo, hi) = (day_number(first), day_number(last));
    if hi > lo { (lo, hi) } else { (lo, lo + 1.0) }
}

fn value_range(frame: &ChartFrame) -> Option<(f64, f64)> {
    let (min, max) = frame
        .rows
        .iter()
        .map(|r| r.value)
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if !(min.is_finite() && max.is_finite()) {
        None
    } else if max > min {
        Some((min, max))
    } else {
        Some((min - 0.5, max + 0.5))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // top row is the max
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let (mut x0, mut y0) = (from.0 as isize, from.1 as isize);
    let (x1, y1) = (to.0 as isize, to.1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if let Some(cell) = grid
            .get_mut(y0 as usize)
            .and_then(|row| row.get_mut(x0 as usize))
            .filter(|c| **c == ' ')
        {
            *cell = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChartRow;

    fn row(date: &str, proxy: &str, value: f64) -> ChartRow {
        ChartRow {
            period: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            proxy: proxy.into(),
            value,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let frame = ChartFrame {
            title: "t".into(),
            rows: vec![
                row("2023-01-01", "a", 1.0),
                row("2023-07-01", "a", 1.0),
                row("2023-01-01", "b", 3.0),
                row("2023-07-01", "b", 3.0),
            ],
        };

        let txt = render_chart(&frame, 10, 5);
        let expected = concat!(
            "Plot: t | period=[2023-01-01, 2023-07-01] | y=[0.90, 3.10]\n",
            "oooooooooo\n",
            "          \n",
            "          \n",
            "          \n",
            "**********\n",
            "* a\n",
            "o b\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn single_point_and_empty_frames_render() {
        let one = ChartFrame {
            title: "one".into(),
            rows: vec![row("2023-01-01", "a", 2.0)],
        };
        let txt = render_chart(&one, 10, 5);
        assert_eq!(txt.lines().count(), 1 + 5 + 1);
        assert_eq!(txt.matches('*').count(), 2);

        let empty = ChartFrame {
            title: "empty".into(),
            rows: Vec::new(),
        };
        assert_eq!(render_chart(&empty, 10, 5), "Plot: empty | (no data)\n");
    }
}
