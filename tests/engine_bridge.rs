use chessboard::config::Config;
use chessboard::uci::{request_move, EngineError};

// A scripted stand-in for the engine subprocess: it answers the UCI
// handshake, emits one info line with a centipawn score, then a bestmove,
// and exits on quit.
const MOCK_ENGINE: &str = r#"
while read line; do
  case "$line" in
    uci) printf 'id name mock\nid author nobody\nuciok\n' ;;
    isready) printf 'readyok\n' ;;
    go*) printf 'info depth 5 seldepth 7 score cp -42 nodes 1234 pv e7e5\nbestmove e7e5 ponder g1f3\n' ;;
    quit) exit 0 ;;
  esac
done
"#;

const MATED_ENGINE: &str = r#"
while read line; do
  case "$line" in
    uci) printf 'uciok\n' ;;
    isready) printf 'readyok\n' ;;
    go*) printf 'bestmove (none)\n' ;;
    quit) exit 0 ;;
  esac
done
"#;

fn scripted_config(script: &str) -> Config {
    Config {
        engine_command: vec!["sh".to_string(), "-c".to_string(), script.to_string()],
        search_depth: 5,
    }
}

#[test]
fn scripted_engine_round_trip() {
    let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
    let reply = request_move(&scripted_config(MOCK_ENGINE), fen).expect("mock engine answers");
    assert_eq!(reply.best_move, "e7e5");
    assert_eq!(reply.score_cp, Some(-42));
}

#[test]
fn an_engine_with_nothing_to_play_is_reported() {
    let fen = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
    match request_move(&scripted_config(MATED_ENGINE), fen) {
        Err(EngineError::NoBestMove) => {}
        other => panic!("expected NoBestMove, got {:?}", other),
    }
}

#[test]
fn a_missing_engine_binary_is_a_spawn_error() {
    let config = Config {
        engine_command: vec!["definitely-not-a-chess-engine".to_string()],
        search_depth: 5,
    };
    match request_move(&config, "8/8/8/8/8/8/8/8 w - - 0 1") {
        Err(EngineError::Spawn { .. }) => {}
        other => panic!("expected a spawn error, got {:?}", other),
    }
}

#[test]
fn an_engine_that_dies_mid_handshake_is_a_closed_pipe() {
    // Reads one command, then exits without ever sending uciok.
    let config = scripted_config("read line; exit 0");
    match request_move(&config, "8/8/8/8/8/8/8/8 w - - 0 1") {
        Err(EngineError::PipeClosed) | Err(EngineError::Io(_)) => {}
        other => panic!("expected a pipe failure, got {:?}", other),
    }
}
