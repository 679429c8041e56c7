//! SPV ancestry engine.
//!
//! A payment is proven by its *ancestry*: the prior transactions its inputs
//! spend, back to parents that already carry a merkle proof.
//!
//! 1. **Chunks**: the type-tagged, length-prefixed framing of the binary form.
//! 2. **Ancestry**: the graph itself, an id-keyed arena of ancestors.
//! 3. **Serializers**: binary, nested JSON and the flat TSC JSON list.
//! 4. **Creator**: builds an ancestry from transaction and proof stores.
//! 5. **Verifier**: accepts or rejects a payment under a [`VerifyOptions`] policy.
//!
//! The older flat-parent [`Envelope`] shape is accepted only as an import and
//! export format.

pub mod ancestry;
pub mod ancestry_json;
pub mod chunk;
pub mod creator;
pub mod envelope;
pub mod error;
pub mod merkle;
pub mod options;
pub mod script;
pub mod tsc_json;
pub mod verifier;

pub use ancestry::{Ancestor, Ancestry, ANCESTRY_VERSION_1};
pub use ancestry_json::AncestryJson;
pub use chunk::{decode_chunk, encode_chunk, Chunk, ChunkReader};
pub use creator::AncestryCreator;
pub use envelope::Envelope;
pub use error::SpvError;
pub use merkle::{HeaderChainVerifier, MerkleProofValidation, MerkleProofVerifier};
pub use options::VerifyOptions;
pub use script::{ScriptVerifier, UnimplementedScriptVerifier};
pub use tsc_json::{TscAncestriesJson, TscAncestryJson};
pub use verifier::PaymentVerifier;
