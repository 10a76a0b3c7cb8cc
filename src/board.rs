//! Square geometry and move shaping over the rules library.
//!
//! The rules library owns all board state and legality; this module only
//! maps between pixels and squares and massages candidate moves before
//! they are checked.

use chess::{Board, BoardStatus, ChessMove, Color, File, Piece, Rank, Square};

/// Edge length of one board square in pixels.
pub const TILE_SIZE: f32 = 45.0;
/// Edge length of the whole board in pixels.
pub const BOARD_SIZE: f32 = TILE_SIZE * 8.0;

/// Maps a pixel position to the square under it, or `None` outside the
/// board. The eighth rank is drawn at the top, so the pixel row counts
/// down from rank 8.
pub fn point_to_square(x: f32, y: f32) -> Option<Square> {
    if x < 0.0 || y < 0.0 || x >= BOARD_SIZE || y >= BOARD_SIZE {
        return None;
    }
    let file = (x / TILE_SIZE) as usize;
    let rank = 7 - (y / TILE_SIZE) as usize;
    Some(Square::make_square(
        Rank::from_index(rank),
        File::from_index(file),
    ))
}

/// Top-left pixel of a square, the inverse of [`point_to_square`].
pub fn square_origin(square: Square) -> (f32, f32) {
    let x = square.get_file().to_index() as f32 * TILE_SIZE;
    let y = (7 - square.get_rank().to_index()) as f32 * TILE_SIZE;
    (x, y)
}

/// Rewrites a pawn move onto a back rank as a queen promotion; every other
/// move passes through untouched.
pub fn coerce_promotion(board: &Board, mv: ChessMove) -> ChessMove {
    let to_rank = mv.get_dest().get_rank();
    if board.piece_on(mv.get_source()) == Some(Piece::Pawn)
        && (to_rank == Rank::First || to_rank == Rank::Eighth)
    {
        ChessMove::new(mv.get_source(), mv.get_dest(), Some(Piece::Queen))
    } else {
        mv
    }
}

/// Folds a move list over a starting position. Backs undo and FEN loading.
pub fn replay(start: &Board, moves: &[ChessMove]) -> Board {
    moves
        .iter()
        .fold(*start, |board, mv| board.make_move_new(*mv))
}

/// Message for a finished game, or `None` while play continues.
pub fn game_over_text(board: &Board) -> Option<String> {
    match board.status() {
        BoardStatus::Checkmate => {
            let winner = match board.side_to_move() {
                Color::White => "Black",
                Color::Black => "White",
            };
            Some(format!("{} wins by checkmate!", winner))
        }
        BoardStatus::Stalemate => Some("Stalemate!".to_string()),
        BoardStatus::Ongoing => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn corners_map_to_the_right_squares() {
        assert_eq!(point_to_square(0.0, 0.0), Some(Square::A8));
        assert_eq!(point_to_square(0.0, BOARD_SIZE - 1.0), Some(Square::A1));
        assert_eq!(point_to_square(BOARD_SIZE - 1.0, 0.0), Some(Square::H8));
        assert_eq!(
            point_to_square(BOARD_SIZE - 1.0, BOARD_SIZE - 1.0),
            Some(Square::H1)
        );
    }

    #[test]
    fn points_outside_the_board_map_to_none() {
        assert_eq!(point_to_square(-1.0, 10.0), None);
        assert_eq!(point_to_square(10.0, -1.0), None);
        assert_eq!(point_to_square(BOARD_SIZE, 0.0), None);
        assert_eq!(point_to_square(0.0, BOARD_SIZE + 50.0), None);
    }

    #[test]
    fn tile_centers_round_trip_through_both_mappings() {
        for square in chess::ALL_SQUARES {
            let (x, y) = square_origin(square);
            let center = point_to_square(x + TILE_SIZE / 2.0, y + TILE_SIZE / 2.0);
            assert_eq!(center, Some(square));
        }
    }

    #[test]
    fn pawn_reaching_the_back_rank_promotes_to_a_queen() {
        let board = Board::from_str("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mv = coerce_promotion(&board, ChessMove::new(Square::A7, Square::A8, None));
        assert_eq!(mv.get_promotion(), Some(Piece::Queen));
    }

    #[test]
    fn non_pawn_moves_to_the_back_rank_are_untouched() {
        let board = Board::from_str("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mv = coerce_promotion(&board, ChessMove::new(Square::E1, Square::E2, None));
        assert_eq!(mv.get_promotion(), None);
    }

    #[test]
    fn pawn_moves_short_of_the_back_rank_are_untouched() {
        let board = Board::default();
        let mv = coerce_promotion(&board, ChessMove::new(Square::E2, Square::E4, None));
        assert_eq!(mv.get_promotion(), None);
    }

    #[test]
    fn replay_applies_moves_in_order() {
        let start = Board::default();
        let moves = [
            ChessMove::new(Square::E2, Square::E4, None),
            ChessMove::new(Square::E7, Square::E5, None),
        ];
        let board = replay(&start, &moves);
        assert_eq!(board.piece_on(Square::E4), Some(Piece::Pawn));
        assert_eq!(board.piece_on(Square::E5), Some(Piece::Pawn));
        assert_eq!(board.side_to_move(), Color::White);
        assert_eq!(replay(&start, &[]), start);
    }

    #[test]
    fn checkmate_names_the_winner() {
        // Fool's mate, White to move and mated.
        let board =
            Board::from_str("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        assert_eq!(
            game_over_text(&board),
            Some("Black wins by checkmate!".to_string())
        );
    }

    #[test]
    fn stalemate_is_reported_as_a_draw() {
        let board = Board::from_str("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(game_over_text(&board), Some("Stalemate!".to_string()));
    }

    #[test]
    fn ongoing_games_have_no_message() {
        assert_eq!(game_over_text(&Board::default()), None);
    }
}
