//! Position model wrapper over `shakmaty`.
//!
//! Chess rules (move generation, legality, terminal-state detection) are
//! delegated to `shakmaty`; this module adapts its API to what the
//! orchestrator needs: FEN parsing/formatting, recorded move application,
//! outcome mapping, and a plain-text board rendering for chat replies.

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, File, Move, Outcome, Position, Rank, Square};

use gambit_types::game::GameOutcome;

/// The canonical starting position.
pub fn starting() -> Chess {
    Chess::default()
}

/// Parse a stored FEN back into a position.
///
/// The error message names what went wrong; the orchestrator surfaces it as
/// a corrupt-position failure since only the service itself writes FENs.
pub fn from_fen(fen: &str) -> Result<Chess, String> {
    let parsed: Fen = fen
        .parse()
        .map_err(|e| format!("invalid FEN '{fen}': {e}"))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| format!("unreachable position '{fen}': {e}"))
}

/// Format a position as FEN, the representation persisted and handed to the
/// engine. Carries side to move, castling rights, and the en-passant target.
pub fn to_fen(pos: &Chess) -> String {
    Fen(pos.clone().into_setup(EnPassantMode::Legal)).to_string()
}

/// Play `m` on `pos`, appending its SAN to the movetext record.
///
/// White half-moves are prefixed with the fullmove number (`3. Nf3`); black
/// replies are appended bare. Returns the SAN of the played move.
pub fn play_recorded(pos: &mut Chess, m: &Move, record: &mut String) -> String {
    let number = pos.fullmoves();
    let white_to_move = pos.turn() == Color::White;
    let san = SanPlus::from_move_and_play_unchecked(pos, m).to_string();

    if white_to_move {
        if !record.is_empty() {
            record.push(' ');
        }
        record.push_str(&format!("{number}. "));
    } else if record.is_empty() {
        // black moving first only happens when a record was started elsewhere
        record.push_str(&format!("{number}... "));
    } else {
        record.push(' ');
    }
    record.push_str(&san);
    san
}

/// Map a terminal position to its game outcome, if any.
pub fn outcome(pos: &Chess) -> Option<GameOutcome> {
    pos.outcome().map(|o| match o {
        Outcome::Decisive {
            winner: Color::White,
        } => GameOutcome::WhiteWins,
        Outcome::Decisive {
            winner: Color::Black,
        } => GameOutcome::BlackWins,
        Outcome::Draw => GameOutcome::Draw,
    })
}

/// Render the board as eight ranks of piece letters with a file legend,
/// white's perspective. Uppercase is white, lowercase is black.
pub fn render_ascii(pos: &Chess) -> String {
    let board = pos.board();
    let mut out = String::with_capacity(9 * 18);
    for rank in (0..8u32).rev() {
        out.push(char::from(b'1' + rank as u8));
        out.push(' ');
        for file in 0..8u32 {
            let square = Square::from_coords(File::new(file), Rank::new(rank));
            match board.piece_at(square) {
                Some(piece) => out.push(piece.char()),
                None => out.push('.'),
            }
            if file < 7 {
                out.push(' ');
            }
        }
        out.push('\n');
    }
    out.push_str("  a b c d e f g h");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::uci::UciMove;

    const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn play_uci(pos: &mut Chess, uci: &str, record: &mut String) -> String {
        let m = uci.parse::<UciMove>().unwrap().to_move(pos).unwrap();
        play_recorded(pos, &m, record)
    }

    #[test]
    fn test_starting_position_fen_roundtrip() {
        let pos = starting();
        assert_eq!(to_fen(&pos), STARTING_FEN);
        assert_eq!(to_fen(&from_fen(STARTING_FEN).unwrap()), STARTING_FEN);
    }

    #[test]
    fn test_from_fen_rejects_garbage() {
        assert!(from_fen("not a fen").is_err());
        assert!(from_fen("").is_err());
    }

    #[test]
    fn test_play_recorded_numbers_white_moves_only() {
        let mut pos = starting();
        let mut record = String::new();

        assert_eq!(play_uci(&mut pos, "e2e4", &mut record), "e4");
        assert_eq!(record, "1. e4");

        assert_eq!(play_uci(&mut pos, "e7e5", &mut record), "e5");
        assert_eq!(record, "1. e4 e5");

        assert_eq!(play_uci(&mut pos, "g1f3", &mut record), "Nf3");
        assert_eq!(record, "1. e4 e5 2. Nf3");
    }

    #[test]
    fn test_outcome_none_for_ongoing_game() {
        assert_eq!(outcome(&starting()), None);
    }

    #[test]
    fn test_outcome_detects_fools_mate() {
        let mut pos = starting();
        let mut record = String::new();
        for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            play_uci(&mut pos, uci, &mut record);
        }
        assert_eq!(outcome(&pos), Some(GameOutcome::BlackWins));
        assert_eq!(record, "1. f3 e5 2. g4 Qh4#");
    }

    #[test]
    fn test_render_ascii_starting_position() {
        let ascii = render_ascii(&starting());
        let lines: Vec<&str> = ascii.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "8 r n b q k b n r");
        assert_eq!(lines[1], "7 p p p p p p p p");
        assert_eq!(lines[2], "6 . . . . . . . .");
        assert_eq!(lines[7], "1 R N B Q K B N R");
        assert_eq!(lines[8], "  a b c d e f g h");
    }
}
