use actix_upload::{MultipartFiles, SizeLimit, UploadConfig, UploadFilter, UploadValidator};
use actix_web::{middleware::Logger, post, App, HttpServer, Responder};

#[post("/documents")]
async fn post_documents(files: MultipartFiles) -> actix_web::Result<impl Responder> {
    let title = files.parameter("title").unwrap_or_default().into_owned();
    let documents = files.uploaded_files("documents", SizeLimit::Bytes(100 * 1024 * 1024));

    UploadValidator::new()
        .allow_mime_type(mime::APPLICATION_PDF)
        .file_limit(10)
        .validate_all(&documents)?;

    let names = documents
        .iter()
        .map(|doc| format!("{} ({} bytes)", doc.file_name(), doc.size()))
        .collect::<Vec<_>>();

    Ok(format!("Uploaded {title:?}: {}\n", names.join(", ")))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    HttpServer::new(move || {
        App::new()
            .app_data(UploadConfig::default().memory_threshold(64 * 1024))
            .service(post_documents)
            .wrap(UploadFilter::default())
            .wrap(Logger::default())
    })
    .workers(2)
    .bind(("127.0.0.1", 8080))?
    .run()
    .await
}
