use std::rc::Rc;

use crate::handlers::AsyncRequestHandler;
use crate::http::mime::infer_content_type;
use crate::http::path::canonicalize_path;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::reactor::{Callback, Next};
use crate::repository::AsyncFileRepository;

/// Serves world-readable files from a repository.
///
/// `/` maps to `/index.html`. Missing files and paths escaping the root get
/// 404, files without the world-read bit get 403, read failures get 500.
pub struct FileServingHandler {
    repository: Rc<dyn AsyncFileRepository>,
}

impl FileServingHandler {
    pub fn new(repository: Rc<dyn AsyncFileRepository>) -> Self {
        Self { repository }
    }
}

impl AsyncRequestHandler for FileServingHandler {
    fn handle(&self, request: Request, callback: Callback<Response>) -> Next {
        let mut path = canonicalize_path(&request.uri);
        if path.is_empty() {
            return callback(Response::not_found());
        }
        if path == "/" {
            path = "/index.html".to_string();
        }

        tracing::debug!(uri = %request.uri, path = %path, "Serving file");

        self.repository.read_file(
            &path.clone(),
            Box::new(move |file| {
                let Some(file) = file else {
                    return callback(Response::not_found());
                };

                let readable = file.clone();
                readable.is_world_readable(Box::new(move |world_readable| {
                    if !world_readable {
                        return callback(Response::forbidden());
                    }

                    let contents_of = file.clone();
                    contents_of.read_contents(Box::new(move |contents| {
                        let contents = match contents {
                            Ok(contents) => contents,
                            Err(err) => {
                                tracing::warn!(path = %path, error = %err, "Reading file failed");
                                return callback(Response::internal_error());
                            }
                        };

                        file.read_last_modified(Box::new(move |modified| match modified {
                            Ok(modified) => callback(Response::ok(contents, infer_content_type(&path), modified)),
                            Err(err) => {
                                tracing::warn!(path = %path, error = %err, "Reading modification time failed");
                                callback(Response::internal_error())
                            }
                        }))
                    }))
                }))
            }),
        )
    }
}
