//! Shape rasterization against a logical pixel grid.
//!
//! Every primitive is a provided method on [`Canvas`], so anything that
//! can plot a single pixel gets lines, rectangles and circles for free.
//! Primitives never fail: pixels outside the grid are clipped one by one,
//! and degenerate sizes (`w <= 0`, `h <= 0`, `r <= 0`) draw nothing.
//!
//! Each primitive writes every pixel of its shape exactly once, so
//! [`Color::Invert`] produces the same outline as [`Color::On`].

use crate::framebuffer::Color;

/// A monochrome pixel grid that shapes can be drawn onto.
pub trait Canvas {
    /// Grid size as `(width, height)` in pixels.
    fn bounds(&self) -> (i32, i32);

    /// Apply `color` to one pixel. Must ignore out-of-range coordinates.
    fn plot(&mut self, x: i32, y: i32, color: Color);

    /// Draw a single pixel.
    fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.plot(x, y, color);
    }

    /// Horizontal run of `w` pixels starting at `(x, y)`, clipped.
    fn draw_hline(&mut self, x: i32, y: i32, w: i32, color: Color) {
        let (width, height) = self.bounds();
        if w <= 0 || y < 0 || y >= height {
            return;
        }
        let start = x.max(0);
        let end = x.saturating_add(w).min(width);
        for px in start..end {
            self.plot(px, y, color);
        }
    }

    /// Vertical run of `h` pixels starting at `(x, y)`, clipped.
    fn draw_vline(&mut self, x: i32, y: i32, h: i32, color: Color) {
        let (width, height) = self.bounds();
        if h <= 0 || x < 0 || x >= width {
            return;
        }
        let start = y.max(0);
        let end = y.saturating_add(h).min(height);
        for py in start..end {
            self.plot(x, py, color);
        }
    }

    /// Line between two points, both inclusive.
    ///
    /// Picks the same pixels as Bresenham's algorithm: one per column for
    /// shallow lines, one per row for steep ones, each rounded to the
    /// nearest integer. Only the part of the major axis that overlaps the
    /// canvas is stepped, so far off-screen endpoints cost nothing.
    ///
    /// The endpoints are put in a canonical order first, so
    /// `draw_line(a, b)` and `draw_line(b, a)` touch the same pixels.
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let ((x0, y0), (x1, y1)) = if (x0, y0) <= (x1, y1) {
            ((x0, y0), (x1, y1))
        } else {
            ((x1, y1), (x0, y0))
        };
        let (width, height) = self.bounds();
        let (x0, y0) = (i64::from(x0), i64::from(y0));
        let (x1, y1) = (i64::from(x1), i64::from(y1));
        // Canonical order makes dx non-negative.
        let (dx, dy) = (x1 - x0, y1 - y0);

        if dx == 0 && dy == 0 {
            plot_clipped(self, x0, y0, color);
        } else if dx >= dy.abs() {
            for x in x0.max(0)..=x1.min(i64::from(width) - 1) {
                let y = y0 + round_div(i128::from(x - x0) * i128::from(dy), i128::from(dx));
                plot_clipped(self, x, y, color);
            }
        } else {
            let (top, bottom) = (y0.min(y1), y0.max(y1));
            for y in top.max(0)..=bottom.min(i64::from(height) - 1) {
                let x = x0 + round_div(i128::from(y - y0) * i128::from(dx), i128::from(dy));
                plot_clipped(self, x, y, color);
            }
        }
    }

    /// Rectangle outline with top-left corner `(x, y)`.
    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        if w <= 0 || h <= 0 {
            return;
        }

        let right = x.saturating_add(w - 1);
        let bottom = y.saturating_add(h - 1);

        self.draw_hline(x, y, w, color);
        if h > 1 {
            self.draw_hline(x, bottom, w, color);
        }
        // Sides exclude the corners already drawn by the horizontal edges.
        if h > 2 {
            let top = y.saturating_add(1);
            self.draw_vline(x, top, h - 2, color);
            if w > 1 {
                self.draw_vline(right, top, h - 2, color);
            }
        }
    }

    /// Filled rectangle with top-left corner `(x, y)`.
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        if w <= 0 || h <= 0 {
            return;
        }
        let (_, height) = self.bounds();
        let start = y.max(0);
        let end = y.saturating_add(h).min(height);
        for py in start..end {
            self.draw_hline(x, py, w, color);
        }
    }

    /// Circle outline centred on `(cx, cy)` (midpoint algorithm).
    ///
    /// The midpoint decision is evaluated in closed form per column of the
    /// first octant, and only for offsets that can land on the canvas, so
    /// the cost is bounded by the canvas size whatever the radius.
    fn draw_circle(&mut self, cx: i32, cy: i32, r: i32, color: Color) {
        if r <= 0 {
            return;
        }

        let (width, height) = self.bounds();
        let (cx, cy, r) = (i64::from(cx), i64::from(cy), i64::from(r));
        let [h0, h1] = visible_offsets(cx, width, r);
        let [v0, v1] = visible_offsets(cy, height, r);

        for_each_offset([h0, h1, v0, v1], |x| {
            let Some(y) = midpoint_y(r, x) else {
                return;
            };
            if y < x {
                return;
            }

            // The eight mirrored points coincide when x == 0 or x == y;
            // plot each distinct one once.
            let mut points = [(0i64, 0i64); 8];
            let mut count = 0;
            for (px, py) in [
                (x, y),
                (-x, y),
                (x, -y),
                (-x, -y),
                (y, x),
                (-y, x),
                (y, -x),
                (-y, -x),
            ] {
                if !points[..count].contains(&(px, py)) {
                    points[count] = (px, py);
                    count += 1;
                }
            }
            for &(px, py) in &points[..count] {
                plot_clipped(self, cx + px, cy + py, color);
            }
        });
    }

    /// Filled circle centred on `(cx, cy)`.
    ///
    /// Fills every pixel with `dx² + dy² <= r²` as one horizontal span per
    /// scanline, so the disc has no gaps and no pixel is written twice.
    /// Only scanlines on the canvas are visited.
    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: Color) {
        if r <= 0 {
            return;
        }

        let (width, height) = self.bounds();
        let (cx, cy, r) = (i64::from(cx), i64::from(cy), i64::from(r));
        let r2 = i128::from(r) * i128::from(r);
        let [v0, v1] = visible_offsets(cy, height, r);

        for_each_offset([v0, v1], |dy| {
            let rest = r2 - i128::from(dy) * i128::from(dy);
            let Some(half) = last_where(r, |h| h * h <= rest) else {
                return;
            };
            let left = (cx - half).max(0);
            let right = (cx + half).min(i64::from(width) - 1);

            plot_span(self, left, right, cy + dy, color);
            if dy != 0 {
                plot_span(self, left, right, cy - dy, color);
            }
        });
    }
}

// ── Wide-coordinate helpers ──────────────────────────────────────────────

/// Plot a pixel given in `i64`, ignoring anything off the canvas.
fn plot_clipped<C>(canvas: &mut C, x: i64, y: i64, color: Color)
where
    C: Canvas + ?Sized,
{
    let (width, height) = canvas.bounds();
    if (0..i64::from(width)).contains(&x) && (0..i64::from(height)).contains(&y) {
        canvas.plot(x as i32, y as i32, color);
    }
}

/// Plot `left..=right` on row `y`; `left` and `right` are already clipped.
fn plot_span<C>(canvas: &mut C, left: i64, right: i64, y: i64, color: Color)
where
    C: Canvas + ?Sized,
{
    let (_, height) = canvas.bounds();
    if (0..i64::from(height)).contains(&y) {
        for x in left..=right {
            canvas.plot(x as i32, y as i32, color);
        }
    }
}

/// `n / d` rounded to the nearest integer, halves away from zero. `d != 0`.
///
/// Away from zero is toward the far endpoint, which is where Bresenham's
/// error term breaks ties.
fn round_div(n: i128, d: i128) -> i64 {
    let (n, d) = if d < 0 { (-n, -d) } else { (n, d) };
    let q = (2 * n.abs() + d) / (2 * d);
    (if n < 0 { -q } else { q }) as i64
}

/// Largest `v` in `0..=max` with `pred(v)`, for a predicate that holds on
/// a prefix of that range. `None` if it does not even hold for 0.
fn last_where(max: i64, pred: impl Fn(i128) -> bool) -> Option<i64> {
    if !pred(0) {
        return None;
    }
    let (mut lo, mut hi) = (0, max);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if pred(i128::from(mid)) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Some(lo)
}

/// Row offset chosen by the midpoint circle algorithm in column `x` of the
/// first octant.
///
/// The incremental algorithm keeps `y` while
/// `e(x, y) + e(x, y - 1) < 0`, with `e(x, y) = x² + y² - r²`. Within the
/// octant `y` never drops by more than one per column, so the result is
/// the largest `y` satisfying that inequality.
fn midpoint_y(r: i64, x: i64) -> Option<i64> {
    let (r, x) = (i128::from(r), i128::from(x));
    let limit = 2 * (r * r - x * x);
    last_where(r as i64, |y| 2 * y * y - 2 * y + 1 < limit)
}

/// Offsets `o` in `0..=limit` for which `centre + o` or `centre - o` falls
/// inside `0..extent`, as two inclusive ranges (possibly empty).
fn visible_offsets(centre: i64, extent: i32, limit: i64) -> [(i64, i64); 2] {
    let last = i64::from(extent) - 1;
    [(-centre, last - centre), (centre - last, centre)]
        .map(|(lo, hi)| (lo.max(0), hi.min(limit)))
}

/// Call `f` once for every offset covered by `ranges`, in ascending order.
fn for_each_offset<const N: usize>(mut ranges: [(i64, i64); N], mut f: impl FnMut(i64)) {
    ranges.sort_unstable();
    let mut next = 0;
    for (lo, hi) in ranges {
        if lo > hi {
            continue;
        }
        for offset in lo.max(next)..=hi {
            f(offset);
        }
        next = next.max(hi + 1);
    }
}

// ── Tests ────────────────────────────────────────────────────────────────
