// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// One use case per pipeline invocation. Each one wires the
// other layers together for a single goal:
//
//   clean_use_case  — strip line numbers from a text file
//   fetch_use_case  — download + extract the corpus archive,
//                     merge it into one normalized file
//   train_use_case  — corpus → vocabulary → windows → model,
//                     then export every artefact
//   query_use_case  — interactive next-word loop over a model
//
// Rules for this layer:
//   - No ML math or model code here
//   - No argument parsing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

pub mod clean_use_case;

pub mod fetch_use_case;

pub mod train_use_case;

pub mod query_use_case;
