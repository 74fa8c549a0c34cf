use crate::engine::Frame;
use crate::model::EntityView;
use anyhow::{Context, Result};
use std::io::Write;

/// Consumer of the per-tick snapshot.
pub trait Renderer {
    fn render(&mut self, frame: &Frame) -> Result<()>;
}

/// Logs a one-line summary of every frame.
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn render(&mut self, frame: &Frame) -> Result<()> {
        log::info!(
            "tick {:06}: {} pairs, mean A {:.4}, mean B {:.4}",
            frame.tick,
            frame.pairs.len(),
            mean_next_position(&frame.a),
            mean_next_position(&frame.b)
        );
        Ok(())
    }
}

/// Writes every frame as one line of JSON.
pub struct JsonRenderer<W: Write> {
    writer: W,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn render(&mut self, frame: &Frame) -> Result<()> {
        serde_json::to_writer(&mut self.writer, frame).context("failed to serialize frame")?;
        writeln!(self.writer).context("failed to write newline")?;
        self.writer.flush().context("failed to flush writer stream")?;
        Ok(())
    }
}

/// Draws each population as a character strip over `[0, 1]`.
pub struct TextRenderer<W: Write> {
    writer: W,
    width: usize,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(writer: W, width: usize) -> Self {
        Self {
            writer,
            width: width.max(2),
        }
    }

    fn strip(&self, views: &[EntityView]) -> String {
        let mut counts = vec![0usize; self.width];
        for view in views {
            counts[column(view.next_position, self.width)] += 1;
        }
        counts
            .iter()
            .map(|&count| match count {
                0 => '.',
                1..=9 => char::from(b'0' + count as u8),
                _ => '+',
            })
            .collect()
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, frame: &Frame) -> Result<()> {
        let strip_a = self.strip(&frame.a);
        let strip_b = self.strip(&frame.b);
        writeln!(self.writer, "tick {:06} ({} pairs)", frame.tick, frame.pairs.len())
            .context("failed to write header")?;
        writeln!(self.writer, "A |{strip_a}|").context("failed to write A strip")?;
        writeln!(self.writer, "B |{strip_b}|").context("failed to write B strip")?;
        self.writer.flush().context("failed to flush writer stream")?;
        Ok(())
    }
}

fn column(position: f64, width: usize) -> usize {
    let col = (position.clamp(0.0, 1.0) * (width - 1) as f64).round() as usize;
    col.min(width - 1)
}

fn mean_next_position(views: &[EntityView]) -> f64 {
    if views.is_empty() {
        return f64::NAN;
    }
    views.iter().map(|view| view.next_position).sum::<f64>() / views.len() as f64
}
