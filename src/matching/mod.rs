//! Read matching: flank extraction and barcode resolution.
//!
//! - [`FlankMatcher`]: Locates the variable region between two flanking motifs
//! - [`BarcodeResolver`]: Maps a region to a known barcode, or passes it
//!   through unchanged in reference-free mode
//!
//! ## Matching Algorithm
//!
//! 1. **Length check**: reads shorter than `left + barcode_length + right`
//!    are rejected immediately
//! 2. **Left motif**: Myers' bit-parallel search finds every end position
//!    where the left motif matches with at most `e` edits
//! 3. **Region**: exactly `barcode_length` bases from `{A, C, G, T}` must
//!    follow the left motif
//! 4. **Right motif**: must match with at most `e` edits, anchored right
//!    after the region
//! 5. **Resolution**: the region is compared to each reference barcode in
//!    load order; the first one within `e` edits is reported
//!
//! ## Example
//!
//! ```rust
//! use barseq::core::config::FlankPattern;
//! use barseq::matching::FlankMatcher;
//!
//! let pattern = FlankPattern::new("GCTCATGCACTTGATTCC", "GACTTGACCTGGATGTCT", 18, 1).unwrap();
//! let matcher = FlankMatcher::new(&pattern);
//!
//! let read = b"GCTCATGCACTTGATTCCATGAAGACTGTTGCCGTAGACTTGACCTGGATGTCT";
//! assert_eq!(matcher.extract(read), Some(&b"ATGAAGACTGTTGCCGTA"[..]));
//! ```

pub mod distance;
pub mod flank;
pub mod resolver;

pub use flank::FlankMatcher;
pub use resolver::BarcodeResolver;
