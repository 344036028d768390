//! Final bound at the point of interest.

use crate::analysis::{AnalysisError, BoundType};
use crate::symbolic_math::combine::{self, is_dependent};
use crate::symbolic_math::{Arrival, HoelderRegistry, HoelderSide, Service, SymbolicFunction};

/// Combines the arrival of the flow of interest with the service it receives.
///
/// If the two are dependent one Hölder parameter is minted and shared by sigma and rho.
/// A backlog bound additionally mints the backlog variable, after the Hölder parameter.
///
/// - backlog: `σ = (A.σ ⊕ S.σ) + B(A.ρ ⊕ S.ρ) − b`, `ρ = 0`
/// - delay:   `σ = (A.σ ⊕ S.σ) + B(A.ρ ⊕ S.ρ)`,     `ρ = S.ρ` (at `θq` if dependent)
/// - output:  `σ = (A.σ ⊕ S.σ) + B(A.ρ ⊕ S.ρ)`,     `ρ = A.ρ` (at `θp` if dependent)
pub fn calculate_bound(
    arrival: &Arrival,
    service: &Service,
    bound_type: BoundType,
    hoelders: &mut HoelderRegistry,
) -> Result<Arrival, AnalysisError> {
    let hoelder = is_dependent(arrival, service).then(|| hoelders.create());
    let sigma = combine::bound_sigma(arrival, service, hoelder);
    let dependencies = arrival.dependencies.union(&service.dependencies);

    let result = match bound_type.analysis_bound() {
        BoundType::Backlog => {
            let backlog = SymbolicFunction::new_parameter(hoelders.create());
            Arrival::new(
                SymbolicFunction::additive(sigma, backlog),
                SymbolicFunction::zero(),
                dependencies,
            )
        }
        BoundType::Delay => {
            let rho = match hoelder {
                Some(id) => SymbolicFunction::scaled(service.rho.clone(), id, HoelderSide::Q, false),
                None => service.rho.clone(),
            };
            Arrival::new(sigma, rho, dependencies)
        }
        BoundType::Output => combine::output_bound(arrival, service, hoelder),
        other => {
            return Err(AnalysisError::InvalidConfig(format!(
                "{:?} is not an analysis bound",
                other
            )))
        }
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Calculated {:?} bound ({} parameter(s))",
        bound_type,
        result.parameters().len()
    );

    Ok(result)
}
