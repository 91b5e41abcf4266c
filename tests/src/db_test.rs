use crate::Setup;

use indexmap::IndexMap;
use sieve::{
    db::Builder,
    driver::Source,
    schema::Collection,
    stmt::{Request, Value},
    Db, Error, Execution, Result,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use std::sync::{Arc, Once};

/// A test's sources and the data they were filled with.
pub struct DbTest {
    setup: Box<dyn Setup>,
    builder: Builder,

    /// What each created collection holds, for the interpreter
    data: IndexMap<String, Vec<Value>>,
}

impl DbTest {
    pub fn new(setup: impl Setup) -> DbTest {
        init_logging();

        DbTest {
            setup: Box::new(setup),
            builder: Db::builder(),
            data: IndexMap::new(),
        }
    }

    pub fn setup(&self) -> &dyn Setup {
        &*self.setup
    }

    /// Creates a collection holding `items` and registers it.
    pub fn source(&mut self, collection: Collection, items: Vec<Value>) -> Arc<dyn Source> {
        let source = self.create(collection, items);
        self.register(source.clone());
        source
    }

    /// Creates a collection holding `items` without registering it.
    pub fn create(&mut self, collection: Collection, items: Vec<Value>) -> Arc<dyn Source> {
        self.data.insert(collection.name.clone(), items.clone());
        self.setup.create(collection, items).unwrap()
    }

    /// Creates a collection with another setup than the test's, without registering it.
    pub fn create_in(
        &mut self,
        setup: &dyn Setup,
        collection: Collection,
        items: Vec<Value>,
    ) -> Arc<dyn Source> {
        self.data.insert(collection.name.clone(), items.clone());
        setup.create(collection, items).unwrap()
    }

    pub fn register(&mut self, source: Arc<dyn Source>) -> &mut Self {
        self.builder.shared_source(source);
        self
    }

    pub fn builder(&mut self) -> &mut Builder {
        &mut self.builder
    }

    pub fn db(&mut self) -> Db {
        self.builder.build().unwrap()
    }

    /// What the interpreter returns for `request` over the data of the created collections.
    pub fn expected(&self, request: &Request) -> Result<Value> {
        request.eval(&self.data)
    }

    /// Executes `request` on `db` and asserts the result matches the interpreter's.
    #[track_caller]
    pub fn check(&self, db: &Db, request: &Request) -> Execution {
        let expected = self.expected(request).unwrap();
        let execution = db.execute_explain(request).unwrap();
        pretty_assertions::assert_eq!(
            execution.value,
            expected,
            "{} disagrees with the interpreter on `{request}` ({:?})",
            self.setup.name(),
            execution.strategy
        );
        execution
    }

    /// Executes `request` on `db`, asserting it fails like it does in the interpreter.
    #[track_caller]
    pub fn check_err(&self, db: &Db, request: &Request) -> Error {
        let expected = match self.expected(request) {
            Ok(value) => panic!("the interpreter returned {value:?} for `{request}`"),
            Err(err) => err,
        };
        let err = match db.execute_explain(request) {
            Ok(execution) => panic!(
                "{} returned {:?} for `{request}` ({:?}), expected `{expected}`",
                self.setup.name(),
                execution.value,
                execution.strategy
            ),
            Err(err) => err,
        };
        assert_eq!(
            err.is_expression_evaluation_failed(),
            expected.is_expression_evaluation_failed(),
            "{} failed with `{err}`, expected `{expected}`",
            self.setup.name()
        );
        err
    }
}

fn init_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let env_filter = EnvFilter::builder()
            .with_default_directive(tracing::Level::WARN.into())
            .from_env_lossy();
        let subscriber = FmtSubscriber::builder()
            .with_test_writer()
            .with_env_filter(env_filter)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
