//! Hooks the field gate into juniper.
//!
//! `Guarded<T>` presents itself to the schema exactly as `T` (same name, same
//! meta), but runs [`AuthInterceptor`] before delegating each field. When the
//! gate authenticates, the field and its whole subtree resolve against a
//! derived context installed with `Executor::replaced_context`; siblings
//! keep the original one.

use juniper::meta::MetaType;
use juniper::{
    Arguments, BoxFuture, DefaultScalarValue, ExecutionResult, Executor, FieldError, GraphQLType,
    GraphQLValue, GraphQLValueAsync, IntoFieldError, Registry,
};
use std::sync::Arc;

use super::context::GraphQLContext;
use super::interceptor::{AuthInterceptor, FieldVisit, GateDecision};

pub struct Guarded<T> {
    inner: T,
    interceptor: Arc<AuthInterceptor>,
}

impl<T> Guarded<T> {
    pub fn new(inner: T, interceptor: Arc<AuthInterceptor>) -> Self {
        Self { inner, interceptor }
    }

    pub fn interceptor(&self) -> &AuthInterceptor {
        &self.interceptor
    }

    /// `Ok(None)`: resolve with the current context.
    /// `Ok(Some(ctx))`: resolve with the derived context.
    fn gate(
        &self,
        object: &str,
        field: &str,
        context: &GraphQLContext,
    ) -> Result<Option<GraphQLContext>, FieldError> {
        let visit = FieldVisit {
            operation_name: context.operation().name(),
            object,
            field,
        };

        match self.interceptor.intercept(&visit, context.scope()) {
            Ok(GateDecision::Skip(_)) => Ok(None),
            Ok(GateDecision::Authenticated(scope)) => Ok(Some(context.derive(scope))),
            Err(e) => Err(e.into_field_error()),
        }
    }
}

impl<T> GraphQLValue<DefaultScalarValue> for Guarded<T>
where
    T: GraphQLValue<DefaultScalarValue, Context = GraphQLContext, TypeInfo = ()>,
{
    type Context = GraphQLContext;
    type TypeInfo = ();

    fn type_name<'i>(&self, info: &'i Self::TypeInfo) -> Option<&'i str> {
        self.inner.type_name(info)
    }

    fn concrete_type_name(&self, context: &Self::Context, info: &Self::TypeInfo) -> String {
        self.inner.concrete_type_name(context, info)
    }

    fn resolve_field(
        &self,
        info: &Self::TypeInfo,
        field_name: &str,
        arguments: &Arguments<DefaultScalarValue>,
        executor: &Executor<Self::Context, DefaultScalarValue>,
    ) -> ExecutionResult<DefaultScalarValue> {
        let object = self.inner.type_name(info).unwrap_or_default();

        match self.gate(object, field_name, executor.context())? {
            Some(derived) => {
                let executor = executor.replaced_context(&derived);
                self.inner
                    .resolve_field(info, field_name, arguments, &executor)
            }
            None => self.inner.resolve_field(info, field_name, arguments, executor),
        }
    }
}

impl<T> GraphQLValueAsync<DefaultScalarValue> for Guarded<T>
where
    T: GraphQLValueAsync<DefaultScalarValue, Context = GraphQLContext, TypeInfo = ()>,
{
    fn resolve_field_async<'a>(
        &'a self,
        info: &'a Self::TypeInfo,
        field_name: &'a str,
        arguments: &'a Arguments<DefaultScalarValue>,
        executor: &'a Executor<Self::Context, DefaultScalarValue>,
    ) -> BoxFuture<'a, ExecutionResult<DefaultScalarValue>> {
        Box::pin(async move {
            let object = self.inner.type_name(info).unwrap_or_default();

            match self.gate(object, field_name, executor.context())? {
                Some(derived) => {
                    let executor = executor.replaced_context(&derived);
                    self.inner
                        .resolve_field_async(info, field_name, arguments, &executor)
                        .await
                }
                None => {
                    self.inner
                        .resolve_field_async(info, field_name, arguments, executor)
                        .await
                }
            }
        })
    }
}

impl<T> GraphQLType<DefaultScalarValue> for Guarded<T>
where
    T: GraphQLType<DefaultScalarValue, Context = GraphQLContext, TypeInfo = ()>,
{
    fn name(info: &Self::TypeInfo) -> Option<&str> {
        T::name(info)
    }

    fn meta<'r>(
        info: &Self::TypeInfo,
        registry: &mut Registry<'r, DefaultScalarValue>,
    ) -> MetaType<'r, DefaultScalarValue>
    where
        DefaultScalarValue: 'r,
    {
        T::meta(info, registry)
    }
}
