//! Per-datagram DNS request handling.
//!
//! A request moves through two steps. Decoding parses the datagram and
//! checks that it is a single `IN A` question; anything else is dropped
//! without a reply. Responding walks the name and encodes exactly one
//! response carrying the original id and question.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{DNSClass, RData, Record, RecordType};
use ipdns_resolver::{Resolution, Resolver};
use ipdns_types::{DomainName, Label};
use tracing::{debug, warn};

use crate::config::{BackendFailurePolicy, ServerConfig};

/// What to do with one received datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Send nothing.
    Drop(DropReason),
    /// Send these bytes back to the source address.
    Reply(Vec<u8>),
}

/// Why a datagram gets no reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The bytes are not a DNS message.
    Malformed,
    /// The message is a response, not a query.
    NotQuery,
    UnsupportedOpcode(OpCode),
    /// Anything but exactly one question.
    QuestionCount(usize),
    UnsupportedQuestion {
        class: DNSClass,
        record_type: RecordType,
    },
    /// The question name has a label that is not ASCII.
    InvalidName,
    /// The response could not be encoded.
    Encode,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => f.write_str("malformed message"),
            Self::NotQuery => f.write_str("message is a response"),
            Self::UnsupportedOpcode(op) => write!(f, "unsupported opcode {op:?}"),
            Self::QuestionCount(n) => write!(f, "expected one question, got {n}"),
            Self::UnsupportedQuestion { class, record_type } => {
                write!(f, "unsupported question {class} {record_type}")
            }
            Self::InvalidName => f.write_str("invalid question name"),
            Self::Encode => f.write_str("response encoding failed"),
        }
    }
}

/// A request that passed validation.
struct Decoded {
    request: Message,
    question: Query,
    name: DomainName,
}

/// Turns one request datagram into at most one response datagram.
pub struct DnsRequestHandler {
    resolver: Arc<Resolver>,
    answer_ttl: u32,
    request_timeout: Duration,
    backend_failure: BackendFailurePolicy,
}

impl DnsRequestHandler {
    pub fn new(resolver: Arc<Resolver>, config: &ServerConfig) -> Self {
        Self {
            resolver,
            answer_ttl: config.answer_ttl,
            request_timeout: config.request_timeout(),
            backend_failure: config.backend_failure_policy,
        }
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    /// Handle one datagram. Never fails; every problem is an [`Outcome`].
    pub async fn handle(&self, raw: &[u8]) -> Outcome {
        let decoded = match decode(raw) {
            Ok(decoded) => decoded,
            Err(reason) => {
                debug!(%reason, bytes = raw.len(), "dropping request");
                return Outcome::Drop(reason);
            }
        };
        let (code, addrs) = self.answer(&decoded.name).await;
        match encode_response(&decoded, code, &addrs, self.answer_ttl) {
            Ok(bytes) => Outcome::Reply(bytes),
            Err(e) => {
                warn!(id = decoded.request.id(), error = %e, "failed to encode response");
                Outcome::Drop(DropReason::Encode)
            }
        }
    }

    async fn answer(&self, name: &DomainName) -> (ResponseCode, Vec<std::net::Ipv4Addr>) {
        let walk = tokio::time::timeout(self.request_timeout, self.resolver.resolve(name)).await;
        match walk {
            Ok(Ok(Resolution::Found(addrs))) => {
                debug!(%name, answers = addrs.len(), "resolved");
                (ResponseCode::NoError, addrs)
            }
            Ok(Ok(Resolution::NotFound(reason))) => {
                debug!(%name, %reason, "not found");
                (ResponseCode::NXDomain, Vec::new())
            }
            Ok(Err(e)) => {
                warn!(%name, error = %e, policy = ?self.backend_failure, "backend failure");
                let code = match self.backend_failure {
                    BackendFailurePolicy::NxDomain => ResponseCode::NXDomain,
                    BackendFailurePolicy::ServFail => ResponseCode::ServFail,
                };
                (code, Vec::new())
            }
            Err(_) => {
                warn!(%name, timeout = ?self.request_timeout, "request deadline expired");
                (ResponseCode::ServFail, Vec::new())
            }
        }
    }
}

impl fmt::Debug for DnsRequestHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DnsRequestHandler")
            .field("answer_ttl", &self.answer_ttl)
            .field("request_timeout", &self.request_timeout)
            .field("backend_failure", &self.backend_failure)
            .finish_non_exhaustive()
    }
}

fn decode(raw: &[u8]) -> Result<Decoded, DropReason> {
    let request = Message::from_vec(raw).map_err(|_| DropReason::Malformed)?;
    if request.message_type() != MessageType::Query {
        return Err(DropReason::NotQuery);
    }
    if request.op_code() != OpCode::Query {
        return Err(DropReason::UnsupportedOpcode(request.op_code()));
    }
    let question = match request.queries() {
        [question] => question.clone(),
        other => return Err(DropReason::QuestionCount(other.len())),
    };
    if question.query_class() != DNSClass::IN || question.query_type() != RecordType::A {
        return Err(DropReason::UnsupportedQuestion {
            class: question.query_class(),
            record_type: question.query_type(),
        });
    }
    let labels = question
        .name()
        .iter()
        .map(Label::from_bytes)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| DropReason::InvalidName)?;
    let name = DomainName::from_labels(labels).map_err(|_| DropReason::InvalidName)?;
    Ok(Decoded {
        request,
        question,
        name,
    })
}

fn encode_response(
    decoded: &Decoded,
    code: ResponseCode,
    addrs: &[std::net::Ipv4Addr],
    ttl: u32,
) -> Result<Vec<u8>, hickory_proto::error::ProtoError> {
    let request = &decoded.request;
    let mut response = Message::new();
    response.set_id(request.id());
    response.set_message_type(MessageType::Response);
    response.set_op_code(request.op_code());
    response.set_recursion_desired(request.recursion_desired());
    response.set_recursion_available(true);
    response.set_response_code(code);
    response.add_query(decoded.question.clone());
    for addr in addrs {
        let mut record = Record::with(decoded.question.name().clone(), RecordType::A, ttl);
        record.set_data(Some(RData::A(A(*addr))));
        response.add_answer(record);
    }
    response.to_vec()
}
