use std::rc::Rc;

use crate::access::dns::DnsClient;
use crate::access::htaccess::parse_htaccess_rules;
use crate::handlers::{AsyncRequestFilter, FilterError};
use crate::http::path::{canonicalize_path, htaccess_path};
use crate::http::request::Request;
use crate::reactor::{Callback, Next};
use crate::repository::AsyncFileRepository;

/// Applies the `.htaccess` file next to the requested path.
///
/// No file means allow. A file that cannot be read or parsed is reported as a
/// [`FilterError`].
pub struct HtAccessFilter {
    repository: Rc<dyn AsyncFileRepository>,
    dns: Rc<dyn DnsClient>,
}

impl HtAccessFilter {
    pub fn new(repository: Rc<dyn AsyncFileRepository>, dns: Rc<dyn DnsClient>) -> Self {
        Self { repository, dns }
    }
}

impl AsyncRequestFilter for HtAccessFilter {
    fn allow(&self, request: &Request, callback: Callback<Result<bool, FilterError>>) -> Next {
        let rules_path = htaccess_path(&canonicalize_path(&request.uri));
        if rules_path.is_empty() {
            return callback(Ok(true));
        }

        let remote = request.remote_addr;
        let dns = self.dns.clone();

        self.repository.read_file(
            &rules_path.clone(),
            Box::new(move |file| {
                let Some(file) = file else {
                    return callback(Ok(true));
                };

                file.read_contents(Box::new(move |contents| {
                    let verdict = contents.map_err(FilterError::Io).and_then(|contents| {
                        parse_htaccess_rules(&String::from_utf8_lossy(&contents), dns.as_ref())
                            .map(|htaccess| htaccess.allows(remote))
                            .map_err(FilterError::HtAccess)
                    });
                    if let Err(err) = &verdict {
                        tracing::warn!(path = %rules_path, error = %err, "Unusable htaccess");
                    }
                    callback(verdict)
                }))
            }),
        )
    }
}
