//! File upload decoding for Actix Web.
//!
//! [`UploadFilter`] parses `multipart/form-data` bodies into [`MultipartFiles`] and attaches them to
//! the request. File inputs are then decoded into [`UploadedFile`]s, either through the
//! [`MultipartFiles`] extractor or with a [`FileUploadDecoder`]. A file input left empty by the user
//! decodes to "nothing uploaded", never to an empty file.
//!
//! Size limits travel with each uploaded file and are enforced separately by an
//! [`UploadValidator`].
//!
//! # Examples
//! ```no_run
//! use actix_upload::{
//!     FileUploadDecoder, SizeLimit, UploadConfig, UploadFilter, UploadMode, UploadValidator,
//! };
//! use actix_web::{post, App, HttpRequest, HttpResponse, HttpServer, Responder};
//!
//! #[post("/photos")]
//! async fn photos(req: HttpRequest) -> actix_web::Result<impl Responder> {
//!     let files = FileUploadDecoder
//!         .decode(&req, "photos", UploadMode::Multiple)
//!         .map(|decoded| decoded.into_files())
//!         .unwrap_or_default();
//!
//!     UploadValidator::new().file_limit(5).validate_all(&files)?;
//!
//!     let dir = FileUploadDecoder.upload_directory(&req);
//!     for file in &files {
//!         file.write(dir.join(file.file_name()))?;
//!     }
//!
//!     Ok(HttpResponse::Ok().body(format!("stored {} photos", files.len())))
//! }
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     HttpServer::new(|| {
//!         App::new()
//!             .app_data(UploadConfig::default().size_limit(SizeLimit::Bytes(5 * 1024 * 1024)))
//!             .wrap(UploadFilter::default())
//!             .service(photos)
//!     })
//!     .bind(("127.0.0.1", 8080))?
//!     .run()
//!     .await
//! }
//! ```

mod config;
mod decoder;
mod directory;
mod error;
mod filter;
mod item;
mod multipart;
mod request;
mod uploaded;
mod validate;

pub use self::config::UploadConfig;
pub use self::decoder::{DecodedUpload, FileUploadDecoder, UploadMode};
pub use self::directory::resolve_upload_directory;
pub use self::error::UploadError;
pub use self::filter::{UploadFilter, UploadFilterMiddleware};
pub use self::item::{FileContent, FileItem};
pub use self::multipart::MultipartFiles;
pub use self::request::{resolve_multipart, MultipartRequest, Request};
pub use self::uploaded::{SizeLimit, UploadedFile};
pub use self::validate::UploadValidator;
