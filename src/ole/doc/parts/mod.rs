/// Internal parts for parsing DOC file structures.
///
/// This module contains parsers for the binary structures on the text path
/// of legacy Word documents:
/// - FIB (File Information Block)
/// - Piece table (CLX)
/// - Piece text decoding
pub mod fib;
pub mod piece_table;
pub mod text;
