use crate::error::IngestError;
use crate::ingest::{IngestReport, Ingestor};
use crate::types::{Picture, PictureKind};
use bytes::{Buf, BufMut, Bytes};
use futures::{pin_mut, stream, Stream, StreamExt};
use log::{debug, info, warn};
use multer::{parse_boundary, Field, Multipart};
use serde_json::json;
use std::convert::Infallible;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

const STORED: &str = "Data stored successfully";

pub async fn run(addr: SocketAddr, ingestor: Arc<Ingestor>, max_length: u64) {
    info!("Listening for detection events on {}", addr);
    warp::serve(routes(ingestor, max_length)).run(addr).await;
}

/// `POST /` takes either a bare XML body or a multipart form carrying the
/// XML alongside the plate and detection pictures. Bodies may be sent with
/// or without a `Content-Length`.
pub fn routes(
    ingestor: Arc<Ingestor>,
    max_length: u64,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_ingestor = warp::any().map(move || ingestor.clone());
    warp::post()
        .and(warp::path::end())
        .and(warp::header::optional::<u64>("content-length"))
        .and(warp::header::optional::<String>("content-type"))
        .and(warp::body::stream())
        .and(warp::any().map(move || max_length))
        .and(with_ingestor)
        .and_then(handle_post)
}

async fn handle_post<S, B>(
    length: Option<u64>,
    content_type: Option<String>,
    body: S,
    max_length: u64,
    ingestor: Arc<Ingestor>,
) -> Result<Response, Infallible>
where
    S: Stream<Item = Result<B, warp::Error>>,
    B: Buf,
{
    info!("Endpoint is called...");
    let result = match read_body(length, body, max_length).await {
        Ok(body) => ingest(&ingestor, content_type.as_deref(), body).await,
        Err(e) => Err(e),
    };
    Ok(respond(result))
}

/// Collects the body, refusing it once it passes `max_length`. A declared
/// length is checked before anything is read; chunked bodies are counted
/// as they arrive.
async fn read_body<S, B>(length: Option<u64>, body: S, max_length: u64) -> Result<Bytes, IngestError>
where
    S: Stream<Item = Result<B, warp::Error>>,
    B: Buf,
{
    let too_large = || IngestError::TooLarge { limit: max_length };
    if length.map_or(false, |l| l > max_length) {
        return Err(too_large());
    }

    let mut data: Vec<u8> = vec![];
    pin_mut!(body);
    while let Some(buf) = body.next().await {
        let buf = buf?;
        if (data.len() + buf.remaining()) as u64 > max_length {
            return Err(too_large());
        }
        data.put(buf);
    }
    Ok(Bytes::from(data))
}

async fn ingest(
    ingestor: &Ingestor,
    content_type: Option<&str>,
    body: Bytes,
) -> Result<IngestReport, IngestError> {
    match content_type.filter(|ct| ct.to_ascii_lowercase().starts_with("multipart/")) {
        Some(ct) => {
            let boundary = parse_boundary(ct)?;
            let (xml, pictures) = read_form(body, boundary).await?;
            ingestor.ingest(&xml, pictures).await
        }
        None => ingestor.ingest(&body, Vec::new()).await,
    }
}

fn respond(result: Result<IngestReport, IngestError>) -> Response {
    match result {
        Ok(report) => {
            debug!(
                "Acknowledging event for plate {}",
                report.event.license_plate
            );
            STORED.into_response()
        }
        Err(IngestError::TooLarge { limit }) => {
            warn!("Refusing request body over {} bytes", limit);
            message(StatusCode::PAYLOAD_TOO_LARGE, "File is too large")
        }
        Err(e) => {
            warn!("Rejecting detection event: {}", e);
            message(StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}

fn message(status: StatusCode, message: &str) -> Response {
    warp::reply::with_status(warp::reply::json(&json!({ "message": message })), status)
        .into_response()
}

async fn read_form(body: Bytes, boundary: String) -> Result<(Vec<u8>, Vec<Picture>), IngestError> {
    let mut xml: Option<Vec<u8>> = None;
    let mut pictures: Vec<Picture> = Vec::new();

    let body = stream::once(async move { Ok::<Bytes, io::Error>(body) });
    let mut form = Multipart::new(body, boundary);
    while let Some(field) = form.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        debug!("Got part {}", name);
        if let Some(kind) = PictureKind::from_field(&name) {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await?;
            if pictures.iter().any(|p| p.kind == kind) {
                warn!("Ignoring repeated {} part", kind);
            } else if filename.is_empty() {
                // No filename means the camera sent an empty file field.
                debug!("Ignoring {} part without a filename", kind);
            } else {
                pictures.push(Picture {
                    kind,
                    filename,
                    data: data.to_vec(),
                });
            }
        } else if xml.is_none() && is_metadata(&field) {
            xml = Some(field.bytes().await?.to_vec());
        } else {
            warn!("Ignoring part {}", name);
        }
    }

    let xml = xml.ok_or(IngestError::MissingMetadata)?;
    Ok((xml, pictures))
}

fn is_metadata(field: &Field<'_>) -> bool {
    let xml_name = |s: &str| s.to_ascii_lowercase().ends_with(".xml");
    field
        .content_type()
        .map_or(false, |ct| ct.essence_str().contains("xml"))
        || field.name().map_or(false, xml_name)
        || field.file_name().map_or(false, xml_name)
}
