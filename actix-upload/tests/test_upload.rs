use actix_upload::{
    test::{create_form_data_payload_and_headers, TestPart},
    DecodedUpload, FileUploadDecoder, MultipartFiles, SizeLimit, UploadConfig, UploadFilter,
    UploadMode, UploadValidator,
};
use actix_web::{
    http::StatusCode,
    test::{self, TestRequest},
    web, App, HttpRequest, HttpResponse,
};

fn form_request(uri: &str, parts: &[TestPart]) -> TestRequest {
    let (body, headers) = create_form_data_payload_and_headers(parts);
    headers
        .into_iter()
        .fold(TestRequest::post().uri(uri), |req, hdr| req.insert_header(hdr))
        .set_payload(body)
}

async fn store(req: HttpRequest) -> actix_web::Result<HttpResponse> {
    let files = match FileUploadDecoder.decode(&req, "files", UploadMode::Multiple) {
        Some(DecodedUpload::Multiple(files)) => files,
        _ => return Ok(HttpResponse::InternalServerError().finish()),
    };

    UploadValidator::new()
        .allow_types(r"\.txt$")
        .expect("valid pattern")
        .file_limit(2)
        .validate_all(&files)?;

    let dir = FileUploadDecoder.upload_directory(&req);
    for file in &files {
        file.write(dir.join(format!("stored-{}", file.file_name())))?;
    }

    Ok(HttpResponse::Ok().body(files.len().to_string()))
}

async fn avatar(files: MultipartFiles) -> HttpResponse {
    match files.uploaded_file("avatar", SizeLimit::Unbounded) {
        Some(file) => HttpResponse::Ok().body(file.bytes().unwrap()),
        None => HttpResponse::NoContent().finish(),
    }
}

#[actix_rt::test]
async fn upload_and_store() {
    let _ = env_logger::builder().is_test(true).try_init();

    let spool = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();

    let app = test::init_service(
        App::new()
            .app_data(
                UploadConfig::default()
                    .size_limit(SizeLimit::Bytes(64))
                    .memory_threshold(16)
                    .upload_directory(spool.path()),
            )
            .service(
                web::scope("")
                    .wrap(UploadFilter::new().upload_directory(dest.path()))
                    .route("/store", web::post().to(store)),
            ),
    )
    .await;

    let req = form_request(
        "/store",
        &[
            TestPart::file("files", "a.txt", "short"),
            TestPart::file("files", "", ""),
            TestPart::file("files", "b.txt", "longer than the sixteen byte threshold"),
        ],
    )
    .to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(body, "2");

    assert_eq!(
        std::fs::read(dest.path().join("stored-a.txt")).unwrap(),
        b"short"
    );
    assert_eq!(
        std::fs::read(dest.path().join("stored-b.txt")).unwrap(),
        b"longer than the sixteen byte threshold"
    );
}

#[actix_rt::test]
async fn validation_failures() {
    let app = test::init_service(
        App::new()
            .app_data(UploadConfig::default().size_limit(SizeLimit::Bytes(4)))
            .wrap(UploadFilter::default())
            .route("/store", web::post().to(store)),
    )
    .await;

    let req = form_request("/store", &[TestPart::file("files", "a.txt", "too big")]).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let req = form_request("/store", &[TestPart::file("files", "a.exe", "ok")]).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let req = form_request(
        "/store",
        &[
            TestPart::file("files", "a.txt", "1"),
            TestPart::file("files", "b.txt", "2"),
            TestPart::file("files", "c.txt", "3"),
        ],
    )
    .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn missing_filter() {
    let app = test::init_service(
        App::new()
            .route("/store", web::post().to(store))
            .route("/avatar", web::post().to(avatar)),
    )
    .await;

    let req = form_request("/store", &[TestPart::file("files", "a.txt", "a")]).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let req = form_request("/avatar", &[TestPart::file("avatar", "a.png", "a")]).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_rt::test]
async fn empty_file_input() {
    let app = test::init_service(
        App::new()
            .wrap(UploadFilter::default())
            .route("/avatar", web::post().to(avatar)),
    )
    .await;

    let req = form_request("/avatar", &[TestPart::file("avatar", "", "")]).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let req = form_request(
        "/avatar",
        &[TestPart::file("avatar", "me.png", "png bytes").content_type(mime::IMAGE_PNG)],
    )
    .to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(body, "png bytes");
}
