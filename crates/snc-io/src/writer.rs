//! Serialises a network into the line-oriented file format.

use snc_core::network::Network;
use snc_core::symbolic_math::ArrivalModel;

use crate::errors::FileOperationError;

/// Renders `network` as a network file.
///
/// Only networks the format can express are accepted: constant-rate services, initial
/// arrivals of a named model and aliases free of separators. Networks holding Hölder
/// parameters are refused since those only exist mid-analysis.
pub fn write_network(network: &Network) -> Result<String, FileOperationError> {
    if !network.hoelders().is_empty() {
        return Err(FileOperationError::Unsupported(format!(
            "network holds {} Hölder parameter(s)",
            network.hoelders().len()
        )));
    }

    let mut out = String::new();
    for vertex in network.vertices() {
        check_alias(vertex.alias())?;
        let rate = vertex.service().constant_rate().ok_or_else(|| {
            FileOperationError::Unsupported(format!(
                "service of vertex '{}' is not a constant rate",
                vertex.alias()
            ))
        })?;
        out.push_str(&format!("I {}, FIFO, CR, {}\n", vertex.alias(), rate));
    }
    out.push_str("EOI\n");

    for flow in network.flows() {
        check_alias(flow.alias())?;
        let mut hops = Vec::with_capacity(flow.route().len());
        for (vertex, priority) in flow.route().iter().zip(flow.priorities()) {
            let alias = network
                .vertex(*vertex)
                .map(|v| v.alias())
                .ok_or_else(|| FileOperationError::Unsupported(format!("dangling vertex {}", vertex)))?;
            hops.push(format!("{}:{}", alias, priority));
        }

        let model = flow
            .initial_arrival()
            .and_then(ArrivalModel::recognize)
            .ok_or_else(|| {
                FileOperationError::Unsupported(format!(
                    "initial arrival of flow '{}' is not a named model",
                    flow.alias()
                ))
            })?;

        out.push_str(&format!(
            "F {}, {}, {}, {}\n",
            flow.alias(),
            hops.len(),
            hops.join(", "),
            arrival_fields(&model)
        ));
    }
    out.push_str("EOF\n");

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Wrote network with {} vertices and {} flows",
        network.vertex_count(),
        network.flow_count()
    );

    Ok(out)
}

fn arrival_fields(model: &ArrivalModel) -> String {
    match *model {
        ArrivalModel::Constant { rate } => format!("CONSTANT, {}", rate),
        ArrivalModel::Ebb {
            rate,
            decay,
            prefactor,
        } => format!("EBB, {}, {}, {}", rate, decay, prefactor),
        ArrivalModel::Exponential { lambda } => format!("EXPONENTIAL, {}", lambda),
        ArrivalModel::StationaryTb {
            rate,
            bucket,
            max_theta: Some(max_theta),
        } => format!("STATIONARYTB, {}, {}, {}", rate, bucket, max_theta),
        ArrivalModel::StationaryTb {
            rate,
            bucket,
            max_theta: None,
        } => format!("STATIONARYTB, {}, {}", rate, bucket),
    }
}

fn check_alias(alias: &str) -> Result<(), FileOperationError> {
    let valid = !alias.is_empty()
        && alias.trim() == alias
        && !alias.contains(&[',', ':', '\n', '\r'][..]);
    if valid {
        Ok(())
    } else {
        Err(FileOperationError::Unsupported(format!(
            "alias '{}' cannot be written",
            alias.escape_debug()
        )))
    }
}
