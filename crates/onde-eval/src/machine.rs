//! Machine de réduction : pile de valeurs + règles par primitive.
//!
//! La réduction d'un terme empile exactement une valeur (sa forme normale) ;
//! la règle d'une primitive d'arité N dépile exactement N opérandes et empile
//! exactement un résultat. C'est le seul delta de pile autorisé — tout écart
//! signale un graphe de termes mal formé et fait échouer l'évaluation.

use std::rc::Rc;

use log::{log_enabled, trace, Level};

use onde_core::{codec, Prim, Term};

use crate::{Env, EvalError, EvalResult, Transport};

/// Pile de valeurs (sommet = dernier élément).
type Stack = Vec<Rc<Term>>;

/// Une évaluation en cours : environnement, transport et profondeur de trace.
///
/// Chaque évaluation possède sa machine et donc sa pile ; l'environnement
/// peut être partagé en lecture seule entre plusieurs machines.
pub struct Machine<'a> {
    env: &'a Env,
    transport: &'a dyn Transport,
    depth: usize,
}

impl<'a> Machine<'a> {
    /// Prépare une machine sur `env`, avec `transport` pour `send`.
    pub fn new(env: &'a Env, transport: &'a dyn Transport) -> Self {
        Self { env, transport, depth: 0 }
    }

    /// Réduit `term` en forme normale sur une pile fraîche.
    pub fn evaluate(mut self, term: &Rc<Term>) -> EvalResult<Rc<Term>> {
        let mut stack = Stack::new();
        self.reduce(term, &mut stack)?;
        let value = pop(&mut stack, "evaluate")?;
        if stack.is_empty() {
            Ok(value)
        } else {
            Err(EvalError::UnbalancedStack { left: stack.len() })
        }
    }

    /// Empile la valeur de `term` (delta pile : +1).
    fn reduce(&mut self, term: &Rc<Term>, s: &mut Stack) -> EvalResult<()> {
        match term.as_ref() {
            Term::Ap(fun, arg) => self.reduce_ap(term, fun, arg, s),
            Term::Ref(name) => {
                let def = self.resolve(name)?;
                self.reduce(&def, s)
            }
            _ => {
                s.push(Rc::clone(term));
                Ok(())
            }
        }
    }

    /// Réduit puis dépile : la valeur de `term` sans la laisser sur la pile.
    fn value_of(&mut self, term: &Rc<Term>, s: &mut Stack) -> EvalResult<Rc<Term>> {
        self.reduce(term, s)?;
        pop(s, "value")
    }

    fn resolve(&self, name: &str) -> EvalResult<Rc<Term>> {
        self.env
            .lookup(name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownName(name.to_owned()))
    }

    fn reduce_ap(
        &mut self,
        whole: &Rc<Term>,
        fun: &Rc<Term>,
        arg: &Rc<Term>,
        s: &mut Stack,
    ) -> EvalResult<()> {
        let traced = log_enabled!(Level::Trace);
        if traced {
            trace!("{:indent$}{whole}", "", indent = self.depth * 2);
        }
        self.depth += 1;
        let outcome = self.reduce_ap_inner(fun, arg, s);
        self.depth -= 1;
        if traced && outcome.is_ok() {
            if let Some(top) = s.last() {
                trace!("{:indent$}=> {top}", "", indent = self.depth * 2);
            }
        }
        outcome
    }

    fn reduce_ap_inner(&mut self, fun: &Rc<Term>, arg: &Rc<Term>, s: &mut Stack) -> EvalResult<()> {
        // Position fonction : réduire les applications imbriquées, résoudre
        // les références. L'arité d'une référence est celle de sa définition.
        let mut funv = Rc::clone(fun);
        loop {
            funv = match funv.as_ref() {
                Term::Ap(..) => self.value_of(&funv, s)?,
                Term::Ref(name) => self.resolve(name)?,
                _ => break,
            };
        }
        let arity = funv.arity().unwrap_or(0);
        if arity == 0 {
            // constante en position fonction : l'argument n'est pas consommé
            s.push(funv);
            return Ok(());
        }
        // L'argument n'est réduit que s'il est lui-même un redex ; les
        // références sont collectées telles quelles, ce qui garde les
        // définitions récursives productives.
        match arg.as_ref() {
            Term::Ap(..) => self.reduce(arg, s)?,
            _ => s.push(Rc::clone(arg)),
        }
        self.apply(funv, s)
    }

    /// Applique la valeur-fonction `funv` à l'argument au sommet de la pile.
    fn apply(&mut self, funv: Rc<Term>, s: &mut Stack) -> EvalResult<()> {
        match funv.as_ref() {
            Term::Prim(p) if p.arity() == 1 => self.run_prim(*p, s),
            Term::Prim(p) => {
                let arg = pop(s, p.name())?;
                s.push(Rc::new(Term::Partial { prim: *p, args: vec![arg] }));
                Ok(())
            }
            Term::Partial { prim, args } => {
                let arg = pop(s, prim.name())?;
                let mut collected = args.clone();
                collected.push(arg);
                if collected.len() == prim.arity() {
                    // saturation : rejoue les arguments dans l'ordre
                    // d'application, premier argument syntaxique au sommet
                    for a in collected.into_iter().rev() {
                        s.push(a);
                    }
                    self.run_prim(*prim, s)
                } else {
                    s.push(Rc::new(Term::Partial { prim: *prim, args: collected }));
                    Ok(())
                }
            }
            // une fonction collectée paresseusement (référence, redex)
            Term::Ap(..) | Term::Ref(_) => {
                let resolved = self.value_of(&funv, s)?;
                self.apply(resolved, s)
            }
            other => Err(EvalError::TypeMismatch {
                op: "ap",
                expected: "a function value",
                found: other.to_string(),
            }),
        }
    }

    /// Règle d'une primitive saturée : ses opérandes sont au sommet de la
    /// pile, premier argument syntaxique en premier.
    fn run_prim(&mut self, p: Prim, s: &mut Stack) -> EvalResult<()> {
        match p {
            Prim::Add => self.arith2(s, "add", |a, b| a + b),
            Prim::Mul => self.arith2(s, "mul", |a, b| a * b),
            // troncature vers zéro ; b == 0 suit le piège natif
            Prim::Div => self.arith2(s, "div", |a, b| a / b),
            Prim::Neg => self.arith1(s, "neg", |a| -a),
            Prim::Inc => self.arith1(s, "inc", |a| a + 1),
            Prim::Eq => self.compare(s, "eq", |a, b| a == b),
            Prim::Lt => self.compare(s, "lt", |a, b| a < b),
            Prim::K => {
                let x = pop(s, "t")?;
                let _discarded = pop(s, "t")?;
                s.push(x);
                Ok(())
            }
            Prim::F => {
                let _discarded = pop(s, "f")?;
                let y = pop(s, "f")?;
                s.push(y);
                Ok(())
            }
            Prim::I => {
                let x = pop(s, "i")?;
                s.push(x);
                Ok(())
            }
            Prim::S => {
                // s x y z = x(z)(y(z)), z partagé entre les deux branches
                let x = pop(s, "s")?;
                let y = pop(s, "s")?;
                let z = pop(s, "s")?;
                s.push(Rc::clone(&z));
                self.apply(x, s)?;
                let xz = pop(s, "s")?;
                s.push(z);
                self.apply(y, s)?;
                self.apply(xz, s)
            }
            Prim::C => {
                // c x y z = x(z)(y)
                let x = pop(s, "c")?;
                let y = pop(s, "c")?;
                let z = pop(s, "c")?;
                s.push(z);
                self.apply(x, s)?;
                let xz = pop(s, "c")?;
                s.push(y);
                self.apply(xz, s)
            }
            Prim::B => {
                // b x y z = x(y(z))
                let x = pop(s, "b")?;
                let y = pop(s, "b")?;
                let z = pop(s, "b")?;
                s.push(z);
                self.apply(y, s)?;
                self.apply(x, s)
            }
            Prim::Cons => {
                let car = pop(s, "cons")?;
                let cdr = pop(s, "cons")?;
                s.push(Term::pair(car, cdr));
                Ok(())
            }
            Prim::Car => {
                let (car, _) = self.pop_pair(s, "car")?;
                s.push(car);
                Ok(())
            }
            Prim::Cdr => {
                let (_, cdr) = self.pop_pair(s, "cdr")?;
                s.push(cdr);
                Ok(())
            }
            Prim::IsNil => {
                let v = self.pop_value(s, "isnil")?;
                s.push(select(matches!(v.as_ref(), Term::Nil)));
                Ok(())
            }
            Prim::Mod => {
                let v = self.pop_value(s, "mod")?;
                let bits = codec::modulate(&v)?;
                s.push(Rc::new(Term::Modulated(bits)));
                Ok(())
            }
            Prim::Dem => {
                let v = self.pop_value(s, "dem")?;
                let Term::Modulated(bits) = v.as_ref() else {
                    return Err(EvalError::TypeMismatch {
                        op: "dem",
                        expected: "modulated data",
                        found: v.to_string(),
                    });
                };
                s.push(Rc::new(codec::demodulate_all(bits)?));
                Ok(())
            }
            Prim::Send => {
                let v = self.pop_value(s, "send")?;
                let bits = codec::modulate(&v)?;
                log::debug!("send: {bits}");
                let reply = self.transport.exchange(&bits)?;
                log::debug!("send: reply {reply:?}");
                s.push(Rc::new(codec::demodulate_all(reply.trim())?));
                Ok(())
            }
        }
    }

    /// Dépile un opérande et le force en valeur : références résolues,
    /// redex résiduels réduits.
    fn pop_value(&mut self, s: &mut Stack, op: &'static str) -> EvalResult<Rc<Term>> {
        let t = pop(s, op)?;
        match t.as_ref() {
            Term::Ap(..) | Term::Ref(_) => self.value_of(&t, s),
            _ => Ok(t),
        }
    }

    fn pop_number(&mut self, s: &mut Stack, op: &'static str) -> EvalResult<i64> {
        let v = self.pop_value(s, op)?;
        match v.as_ref() {
            Term::Number(n) => Ok(*n),
            other => Err(EvalError::TypeMismatch {
                op,
                expected: "a number",
                found: other.to_string(),
            }),
        }
    }

    fn pop_pair(
        &mut self,
        s: &mut Stack,
        op: &'static str,
    ) -> EvalResult<(Rc<Term>, Rc<Term>)> {
        let v = self.pop_value(s, op)?;
        match v.as_ref() {
            Term::Pair(car, cdr) => Ok((Rc::clone(car), Rc::clone(cdr))),
            other => Err(EvalError::TypeMismatch {
                op,
                expected: "a pair",
                found: other.to_string(),
            }),
        }
    }

    fn arith1(
        &mut self,
        s: &mut Stack,
        op: &'static str,
        f: impl FnOnce(i64) -> i64,
    ) -> EvalResult<()> {
        let a = self.pop_number(s, op)?;
        s.push(Term::num(f(a)));
        Ok(())
    }

    fn arith2(
        &mut self,
        s: &mut Stack,
        op: &'static str,
        f: impl FnOnce(i64, i64) -> i64,
    ) -> EvalResult<()> {
        let a = self.pop_number(s, op)?;
        let b = self.pop_number(s, op)?;
        s.push(Term::num(f(a, b)));
        Ok(())
    }

    fn compare(
        &mut self,
        s: &mut Stack,
        op: &'static str,
        f: impl FnOnce(i64, i64) -> bool,
    ) -> EvalResult<()> {
        let a = self.pop_number(s, op)?;
        let b = self.pop_number(s, op)?;
        s.push(select(f(a, b)));
        Ok(())
    }
}

/// `t` si `first`, sinon `f` : le résultat des prédicats du langage.
fn select(first: bool) -> Rc<Term> {
    Term::prim(if first { Prim::K } else { Prim::F })
}

fn pop(s: &mut Stack, op: &'static str) -> EvalResult<Rc<Term>> {
    s.pop().ok_or(EvalError::Underflow { op })
}
