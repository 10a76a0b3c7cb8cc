//! Piece sprite table for the board canvas.

use std::collections::HashMap;

use chess::{Color, Piece};
use once_cell::sync::Lazy;

/// One glyph sprite per FEN piece symbol, drawn at tile scale. Both sides
/// share the filled glyph form; the fill color carries the side.
pub static PIECE_GLYPHS: Lazy<HashMap<char, char>> = Lazy::new(|| {
    HashMap::from([
        ('P', '♟'),
        ('N', '♞'),
        ('B', '♝'),
        ('R', '♜'),
        ('Q', '♛'),
        ('K', '♚'),
        ('p', '♟'),
        ('n', '♞'),
        ('b', '♝'),
        ('r', '♜'),
        ('q', '♛'),
        ('k', '♚'),
    ])
});

/// FEN symbol for a piece: uppercase for White, lowercase for Black.
pub fn piece_symbol(piece: Piece, color: Color) -> char {
    let symbol = match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    };
    match color {
        Color::White => symbol.to_ascii_uppercase(),
        Color::Black => symbol,
    }
}

/// Glyph sprite for a piece, looked up through its FEN symbol.
pub fn glyph(piece: Piece, color: Color) -> char {
    PIECE_GLYPHS[&piece_symbol(piece, color)]
}
