//! One-shot weighted multisignature check used by direct submissions.

use shared_crypto::recover_address;
use shared_types::{checked_add, Address, Hash, U256};

use crate::error::MultisigError;

/// Check that `signatures` over `object_hash` come from `signers` and that
/// their `weights` add up to at least `threshold`.
///
/// Aborts on the first signature that fails to recover or recovers to a
/// different address.
pub fn is_valid_weighted_multisignature(
    signers: &[Address],
    weights: &[U256],
    threshold: U256,
    object_hash: &Hash,
    signatures: &[Vec<u8>],
) -> Result<(), MultisigError> {
    if signatures.is_empty() {
        return Err(MultisigError::EmptySignatures);
    }
    if signers.len() != signatures.len() || weights.len() != signatures.len() {
        return Err(MultisigError::LengthMismatch {
            signers: signers.len(),
            weights: weights.len(),
            signatures: signatures.len(),
        });
    }

    let mut weight = U256::zero();
    for (index, ((expected, signer_weight), signature)) in
        signers.iter().zip(weights).zip(signatures).enumerate()
    {
        let recovered = recover_address(object_hash.as_bytes(), signature)
            .map_err(|source| MultisigError::InvalidSignature { index, source })?;
        if recovered != *expected {
            return Err(MultisigError::InvalidSignatory {
                index,
                expected: *expected,
                recovered,
            });
        }
        weight = checked_add(weight, *signer_weight)?;
    }

    if weight < threshold {
        return Err(MultisigError::WeightsBelowThreshold { weight, threshold });
    }
    Ok(())
}
