//! Serialization of run results to CSV.
//!
//! Every file of a run shares the `<date>_<experiment>` prefix:
//!
//! | File | Contents |
//! |------|----------|
//! | `<stem>.csv` | Aggregated counts, one column per sample |
//! | `<stem>_candidates.csv` | Ranked reference-free candidates (reference-free only) |
//! | `<stem>_summary.csv` | Per-sample match statistics |

pub mod tables;
