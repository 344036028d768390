//! # Network File Parser
//!
//! Parses the line-oriented network format with Pest and builds a [`Network`] from the
//! declarations.
//!
//! ## Error Handling
//!
//! Syntax errors and invalid declarations (unknown vertex, mismatched hop count, invalid
//! model parameters) are reported as [`FileOperationError::Parse`] with the 1-based line
//! of the offending declaration. Scheduling disciplines, service kinds and arrival types
//! the calculator does not model are [`FileOperationError::Unsupported`].
//!
//! ## Grammar
//!
//! The grammar is defined in `grammar.pest` at the crate root.

use pest::error::LineColLocation;
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;
use rustc_hash::FxHashMap;

use snc_core::ids::VertexId;
use snc_core::network::Network;
use snc_core::symbolic_math::{constant_rate_service, ArrivalModel};

use crate::ast::{FlowDecl, HopDecl, NetworkFile, ServiceDecl, VertexDecl};
use crate::errors::FileOperationError;

#[derive(Parser)]
#[grammar = "../grammar.pest"]
pub struct NetworkFileParser;

/// Parses a network description into declarations, without building the network.
///
/// Declarations after an `EOF` line are not read.
pub fn parse_network_file(source: &str) -> Result<NetworkFile, FileOperationError> {
    let mut pairs = NetworkFileParser::parse(Rule::file, source).map_err(|e| {
        let line = match e.line_col {
            LineColLocation::Pos((line, _)) | LineColLocation::Span((line, _), _) => line,
        };
        FileOperationError::parse(line, e.to_string())
    })?;

    let mut file = NetworkFile::default();
    let Some(root) = pairs.next() else {
        return Ok(file);
    };
    for pair in root.into_inner() {
        match pair.as_rule() {
            Rule::vertex_line => file.vertices.push(build_vertex(pair)?),
            Rule::flow_line => file.flows.push(build_flow(pair)?),
            Rule::end_of_file => break,
            _ => {}
        }
    }
    Ok(file)
}

/// Builds a network from parsed declarations.
///
/// Vertices get IDs in declaration order, then flows in declaration order.
pub fn build_network(file: &NetworkFile) -> Result<Network, FileOperationError> {
    let mut network = Network::new();
    let mut ids: FxHashMap<&str, VertexId> = FxHashMap::default();

    for vertex in &file.vertices {
        if ids.contains_key(vertex.alias.as_str()) {
            return Err(FileOperationError::parse(
                vertex.line,
                format!("vertex '{}' is declared twice", vertex.alias),
            ));
        }
        let service = match vertex.service {
            ServiceDecl::ConstantRate(rate) => constant_rate_service(rate)
                .map_err(|e| FileOperationError::parse(vertex.line, e.to_string()))?,
        };
        let id = network.add_vertex(service, vertex.alias.clone());
        ids.insert(vertex.alias.as_str(), id);
    }

    for flow in &file.flows {
        let route = flow
            .hops
            .iter()
            .map(|hop| {
                ids.get(hop.vertex.as_str()).copied().ok_or_else(|| {
                    FileOperationError::parse(
                        flow.line,
                        format!("flow '{}' routes through unknown vertex '{}'", flow.alias, hop.vertex),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let priorities: Vec<i32> = flow.hops.iter().map(|hop| hop.priority).collect();
        let arrival = flow
            .arrival
            .build()
            .map_err(|e| FileOperationError::parse(flow.line, e.to_string()))?;
        network
            .add_flow(arrival, &route, &priorities, flow.alias.clone())
            .map_err(|e| FileOperationError::parse(flow.line, e.to_string()))?;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Built network with {} vertices and {} flows",
        network.vertex_count(),
        network.flow_count()
    );

    Ok(network)
}

fn line_of(pair: &Pair<Rule>) -> usize {
    pair.as_span().start_pos().line_col().0
}

fn next_pair<'i>(
    inner: &mut Pairs<'i, Rule>,
    line: usize,
    what: &str,
) -> Result<Pair<'i, Rule>, FileOperationError> {
    inner
        .next()
        .ok_or_else(|| FileOperationError::parse(line, format!("missing {}", what)))
}

fn parse_alias(pair: Pair<Rule>, line: usize) -> Result<String, FileOperationError> {
    let alias = pair.as_str().trim();
    if alias.is_empty() {
        return Err(FileOperationError::parse(line, "empty alias"));
    }
    Ok(alias.to_string())
}

fn parse_number(pair: Pair<Rule>, line: usize) -> Result<f64, FileOperationError> {
    pair.as_str()
        .parse::<f64>()
        .map_err(|e| FileOperationError::parse(line, format!("invalid number '{}': {}", pair.as_str(), e)))
}

fn parse_integer<T: std::str::FromStr>(pair: Pair<Rule>, line: usize) -> Result<T, FileOperationError>
where
    T::Err: std::fmt::Display,
{
    pair.as_str()
        .trim_start_matches('+')
        .parse::<T>()
        .map_err(|e| FileOperationError::parse(line, format!("invalid integer '{}': {}", pair.as_str(), e)))
}

fn build_vertex(pair: Pair<Rule>) -> Result<VertexDecl, FileOperationError> {
    let line = line_of(&pair);
    let mut inner = pair.into_inner();
    let alias = parse_alias(next_pair(&mut inner, line, "alias")?, line)?;
    let scheduling = next_pair(&mut inner, line, "scheduling")?
        .as_str()
        .to_ascii_uppercase();
    let kind = next_pair(&mut inner, line, "service type")?
        .as_str()
        .to_ascii_uppercase();
    let rate = parse_number(next_pair(&mut inner, line, "service rate")?, line)?;

    if scheduling != "FIFO" {
        return Err(FileOperationError::Unsupported(format!(
            "line {}: scheduling discipline {}",
            line, scheduling
        )));
    }
    // A negative value is the service rho.
    let service = match kind.as_str() {
        "CR" => ServiceDecl::ConstantRate(rate.abs()),
        other => {
            return Err(FileOperationError::Unsupported(format!(
                "line {}: service type {}",
                line, other
            )))
        }
    };

    Ok(VertexDecl {
        alias,
        scheduling,
        service,
        line,
    })
}

fn build_flow(pair: Pair<Rule>) -> Result<FlowDecl, FileOperationError> {
    let line = line_of(&pair);
    let mut inner = pair.into_inner();
    let alias = parse_alias(next_pair(&mut inner, line, "alias")?, line)?;
    let declared: usize = parse_integer(next_pair(&mut inner, line, "route length")?, line)?;

    let mut hops = Vec::new();
    let mut kind = None;
    let mut params = Vec::new();
    for p in inner {
        match p.as_rule() {
            Rule::hop => hops.push(build_hop(p, line)?),
            Rule::keyword => kind = Some(p.as_str().to_ascii_uppercase()),
            Rule::number => params.push(parse_number(p, line)?),
            _ => {}
        }
    }

    if hops.len() != declared {
        return Err(FileOperationError::parse(
            line,
            format!(
                "flow '{}' declares {} hop(s) but lists {}",
                alias,
                declared,
                hops.len()
            ),
        ));
    }
    let kind = kind.ok_or_else(|| FileOperationError::parse(line, "missing arrival type"))?;
    let arrival = arrival_model(&kind, &params, line)?;

    Ok(FlowDecl {
        alias,
        hops,
        arrival,
        line,
    })
}

fn build_hop(pair: Pair<Rule>, line: usize) -> Result<HopDecl, FileOperationError> {
    let mut inner = pair.into_inner();
    let vertex = parse_alias(next_pair(&mut inner, line, "hop vertex")?, line)?;
    let priority = parse_integer(next_pair(&mut inner, line, "hop priority")?, line)?;
    Ok(HopDecl { vertex, priority })
}

fn arrival_model(kind: &str, params: &[f64], line: usize) -> Result<ArrivalModel, FileOperationError> {
    let model = match (kind, params) {
        ("CONSTANT", [rate]) => ArrivalModel::Constant { rate: *rate },
        ("EBB", [rate, decay, prefactor]) => ArrivalModel::Ebb {
            rate: *rate,
            decay: *decay,
            prefactor: *prefactor,
        },
        ("EXPONENTIAL", [lambda]) => ArrivalModel::Exponential { lambda: *lambda },
        ("STATIONARYTB", [rate, bucket]) => ArrivalModel::StationaryTb {
            rate: *rate,
            bucket: *bucket,
            max_theta: None,
        },
        ("STATIONARYTB", [rate, bucket, max_theta]) => ArrivalModel::StationaryTb {
            rate: *rate,
            bucket: *bucket,
            max_theta: Some(*max_theta),
        },
        ("CONSTANT" | "EBB" | "EXPONENTIAL" | "STATIONARYTB", _) => {
            return Err(FileOperationError::parse(
                line,
                format!("wrong number of parameters ({}) for {} arrivals", params.len(), kind),
            ))
        }
        (other, _) => {
            return Err(FileOperationError::Unsupported(format!(
                "line {}: arrival type {}",
                line, other
            )))
        }
    };
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TANDEM: &str = "\
# two servers in tandem
I v1, FIFO, CR, 5
I v2, FIFO, CR, 4.5
EOI
F through, 2, v1:0, v2:1, EBB, 1, 2, 0.5
F local, 1, v2:0, CONSTANT, 0.25
EOF
";

    #[test]
    fn parses_declarations() {
        let file = parse_network_file(TANDEM).unwrap();
        assert_eq!(file.vertices.len(), 2);
        assert_eq!(file.vertices[1].service, ServiceDecl::ConstantRate(4.5));
        assert_eq!(file.flows.len(), 2);
        assert_eq!(
            file.flows[0].hops,
            vec![
                HopDecl {
                    vertex: "v1".into(),
                    priority: 0
                },
                HopDecl {
                    vertex: "v2".into(),
                    priority: 1
                },
            ]
        );
        assert_eq!(
            file.flows[0].arrival,
            ArrivalModel::Ebb {
                rate: 1.0,
                decay: 2.0,
                prefactor: 0.5
            }
        );
        assert_eq!(file.flows[1].line, 6);
    }

    #[test]
    fn builds_network() {
        let network = build_network(&parse_network_file(TANDEM).unwrap()).unwrap();
        assert_eq!(network.vertex_count(), 2);
        let through = network.flow_by_alias("through").unwrap();
        let v2 = network.vertex_by_alias("v2").unwrap();
        assert_eq!(through.route().len(), 2);
        assert_eq!(v2.priority_of(through.id()), Some(1));
    }

    #[test]
    fn ignores_unknown_lines_and_stops_at_eof() {
        let source = "Some header\n\nI v, FIFO, CR, 3\nEOF\nI w, FIFO, CR, 3\n";
        let file = parse_network_file(source).unwrap();
        assert_eq!(file.vertices.len(), 1);
    }

    #[test]
    fn negative_service_rate_is_read_as_rho() {
        let file = parse_network_file("I v, FIFO, CR, -3\n").unwrap();
        assert_eq!(file.vertices[0].service, ServiceDecl::ConstantRate(3.0));
    }

    #[test]
    fn hop_count_must_match() {
        let source = "I v, FIFO, CR, 3\nF f, 2, v:0, CONSTANT, 1\n";
        assert!(matches!(
            parse_network_file(source),
            Err(FileOperationError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn unknown_vertex_is_reported_with_line() {
        let source = "I v, FIFO, CR, 3\nF f, 1, w:0, CONSTANT, 1\n";
        let file = parse_network_file(source).unwrap();
        assert!(matches!(
            build_network(&file),
            Err(FileOperationError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn unsupported_models_are_rejected() {
        assert!(matches!(
            parse_network_file("I v, PRIO, CR, 3\n"),
            Err(FileOperationError::Unsupported(_))
        ));
        assert!(matches!(
            parse_network_file("I v, FIFO, CR, 3\nF f, 1, v:0, PARETO, 1\n"),
            Err(FileOperationError::Unsupported(_))
        ));
    }

    #[test]
    fn invalid_parameters_are_parse_errors() {
        let source = "I v, FIFO, CR, 3\nF f, 1, v:0, EBB, 1, 0, 1\n";
        let file = parse_network_file(source).unwrap();
        assert!(matches!(
            build_network(&file),
            Err(FileOperationError::Parse { line: 2, .. })
        ));
        assert!(parse_network_file("I v, FIFO, CR, 3\nF f, 1, v:0, EBB, 1\n").is_err());
    }

    #[test]
    fn malformed_declaration_is_a_syntax_error() {
        assert!(matches!(
            parse_network_file("I v, FIFO, CR\n"),
            Err(FileOperationError::Parse { line: 1, .. })
        ));
    }
}
